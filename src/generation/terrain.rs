//! Terrain dressing: small MUD and ICE patches over open floor.
//!
//! Runs after connectivity repair. Only `Empty` cells are rewritten and both
//! patch tiles are walkable, so regions are unchanged.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::grid::{Coord, Grid, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub enabled: bool,
    /// One patch per this many walkable cells
    pub cells_per_patch: usize,
    /// Chebyshev radius of a patch
    pub patch_radius: usize,
    /// Share of patches that are ice rather than mud
    pub ice_share: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            enabled: false,
            cells_per_patch: TERRAIN_CELLS_PER_PATCH,
            patch_radius: TERRAIN_PATCH_RADIUS,
            ice_share: TERRAIN_ICE_SHARE,
        }
    }
}

/// Scatter patches. Returns the number of cells rewritten.
pub fn dress_terrain<R: Rng + ?Sized>(grid: &mut Grid, params: &TerrainParams, rng: &mut R) -> usize {
    let floor: Vec<Coord> = grid
        .walkable_cells()
        .filter(|c| grid.at(*c) == Tile::Empty)
        .collect();
    if floor.is_empty() || params.cells_per_patch == 0 {
        return 0;
    }

    let patches = floor.len() / params.cells_per_patch;
    let radius = params.patch_radius as isize;
    let mut dressed = 0;
    for _ in 0..patches {
        let center = floor[rng.gen_range(0..floor.len())];
        let tile = if rng.gen_bool(params.ice_share) {
            Tile::Ice
        } else {
            Tile::Mud
        };
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let (r, c) = (center.row as isize + dr, center.col as isize + dc);
                if grid.try_get(r, c) == Some(Tile::Empty) {
                    grid.set(r as usize, c as usize, tile);
                    dressed += 1;
                }
            }
        }
    }
    debug!(patches, dressed, "terrain dressed");
    dressed
}
