//! Cellular-automata cave generator.
//!
//! Random wall noise smoothed by a 4/5 rule. Makes no connectivity promise:
//! the caller must run the connectivity pass afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_min_size, GenerationError};
use crate::constants::*;
use crate::grid::{Grid, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveParams {
    pub wall_probability: f64,
    pub smoothing_passes: usize,
    pub solidify_threshold: usize,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            wall_probability: CAVE_WALL_PROBABILITY,
            smoothing_passes: CAVE_SMOOTHING_PASSES,
            solidify_threshold: CAVE_SOLIDIFY_THRESHOLD,
        }
    }
}

/// Seed the interior with wall noise. Edge cells start as wall.
pub fn seed_noise<R: Rng + ?Sized>(grid: &mut Grid, wall_probability: f64, rng: &mut R) {
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            let tile = if grid.is_border(r, c) || rng.gen_bool(wall_probability) {
                Tile::Wall
            } else {
                Tile::Empty
            };
            grid.set(r, c, tile);
        }
    }
}

/// One double-buffered smoothing generation. Returns the number of cells
/// that changed.
pub fn smooth_once(grid: &mut Grid, threshold: usize) -> usize {
    let prev = grid.clone();
    let mut changed = 0;
    let Some(interior) = prev.interior() else {
        return 0;
    };
    for cell in interior.cells() {
        let walls = prev.wall_count8(cell.row, cell.col);
        let next = if walls > threshold {
            Tile::Wall
        } else if walls < threshold {
            Tile::Empty
        } else {
            prev.at(cell)
        };
        if next != prev.at(cell) {
            grid.put(cell, next);
            changed += 1;
        }
    }
    changed
}

pub fn generate_cave<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &CaveParams,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    ensure_min_size("cave", rows, cols, CAVE_MIN_SIZE, CAVE_MIN_SIZE)?;
    let mut grid = Grid::filled_with_walls(rows, cols)?;
    seed_noise(&mut grid, params.wall_probability, rng);
    for pass in 0..params.smoothing_passes {
        let changed = smooth_once(&mut grid, params.solidify_threshold);
        debug!(pass, changed, "cave smoothing pass");
    }
    grid.seal_border();
    Ok(grid)
}
