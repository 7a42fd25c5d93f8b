//! Recursive-backtracker maze carving.
//!
//! One lattice carver serves both the standalone maze (corridor width 1 over
//! the whole interior) and the backrooms layers (width 2 for the base maze,
//! width 3 inside wide zones, restricted to one zone kind through the mask).
//! The backtracker runs on an explicit stack, so grid size never touches the
//! call stack.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::zones::{ZoneKind, ZoneMask};
use super::{ensure_min_size, GenerationError};
use crate::constants::MAZE_MIN_SIZE;
use crate::grid::{Coord, Grid, Rect, Tile};

/// Carving region for the lattice backtracker.
#[derive(Debug, Clone, Copy)]
pub struct Lattice<'a> {
    /// Cells the carver may open (inclusive). Blocks are laid out from the
    /// top-left corner.
    pub bounds: Rect,
    /// Corridor width; lattice blocks are `width`×`width` with one wall
    /// between neighbours.
    pub width: usize,
    /// Only carve cells owned by this zone kind.
    pub mask: Option<(&'a ZoneMask, ZoneKind)>,
}

impl<'a> Lattice<'a> {
    /// Classic one-wide maze over the grid interior.
    pub fn narrow(grid: &Grid) -> Option<Self> {
        Some(Self {
            bounds: grid.interior()?,
            width: 1,
            mask: None,
        })
    }

    fn step(&self) -> usize {
        self.width + 1
    }

    fn blocks_along(&self, span: usize) -> usize {
        if span < self.width {
            0
        } else {
            (span - self.width) / self.step() + 1
        }
    }

    fn block_rect(&self, i: usize, j: usize) -> Rect {
        let r = self.bounds.r1 + i * self.step();
        let c = self.bounds.c1 + j * self.step();
        Rect::new(r, c, r + self.width - 1, c + self.width - 1)
    }

    /// Wall strip between two orthogonally adjacent blocks.
    fn strip_between(&self, a: (usize, usize), b: (usize, usize)) -> Rect {
        let ra = self.block_rect(a.0, a.1);
        let rb = self.block_rect(b.0, b.1);
        if a.0 != b.0 {
            let row = ra.r2.min(rb.r2) + 1;
            Rect::new(row, ra.c1, row, ra.c2)
        } else {
            let col = ra.c2.min(rb.c2) + 1;
            Rect::new(ra.r1, col, ra.r2, col)
        }
    }

    fn owns(&self, rect: &Rect) -> bool {
        match self.mask {
            None => true,
            Some((mask, kind)) => rect.cells().all(|cell| mask.at(cell) == kind),
        }
    }
}

/// Bookkeeping from one lattice carve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MazeStats {
    /// Lattice blocks opened
    pub open_lattice_cells: usize,
    /// Wall-between-and-neighbour carve operations
    pub carves: usize,
    /// Independent backtracker runs (1 unless the mask splits the lattice)
    pub components: usize,
}

/// Carve a perfect maze (a spanning forest) over the lattice.
///
/// Each connected group of eligible blocks gets its own backtracker run,
/// started from its first block in scan order, so an unmasked lattice starts
/// at the top-left cell.
pub fn carve_lattice<R: Rng + ?Sized>(grid: &mut Grid, lattice: &Lattice, rng: &mut R) -> MazeStats {
    let n_rows = lattice.blocks_along(lattice.bounds.height());
    let n_cols = lattice.blocks_along(lattice.bounds.width());
    let mut stats = MazeStats::default();
    if n_rows == 0 || n_cols == 0 {
        return stats;
    }

    let eligible: Vec<bool> = (0..n_rows * n_cols)
        .map(|idx| lattice.owns(&lattice.block_rect(idx / n_cols, idx % n_cols)))
        .collect();
    let mut visited = vec![false; n_rows * n_cols];

    for start in 0..n_rows * n_cols {
        if !eligible[start] || visited[start] {
            continue;
        }
        stats.components += 1;
        visited[start] = true;
        grid.fill_rect(lattice.block_rect(start / n_cols, start % n_cols), Tile::Empty);
        stats.open_lattice_cells += 1;

        let mut stack = vec![start];
        let mut candidates = Vec::with_capacity(4);
        while let Some(&current) = stack.last() {
            let (i, j) = (current / n_cols, current % n_cols);
            candidates.clear();
            let steps = [
                (i.checked_sub(1), Some(j)),
                (Some(i + 1).filter(|v| *v < n_rows), Some(j)),
                (Some(i), j.checked_sub(1)),
                (Some(i), Some(j + 1).filter(|v| *v < n_cols)),
            ];
            for (ni, nj) in steps {
                let (Some(ni), Some(nj)) = (ni, nj) else {
                    continue;
                };
                let next = ni * n_cols + nj;
                if !eligible[next] || visited[next] {
                    continue;
                }
                if !lattice.owns(&lattice.strip_between((i, j), (ni, nj))) {
                    continue;
                }
                candidates.push((ni, nj));
            }

            let Some(&(ni, nj)) = candidates.choose(rng) else {
                stack.pop();
                continue;
            };
            grid.fill_rect(lattice.strip_between((i, j), (ni, nj)), Tile::Empty);
            grid.fill_rect(lattice.block_rect(ni, nj), Tile::Empty);
            let next = ni * n_cols + nj;
            visited[next] = true;
            stats.open_lattice_cells += 1;
            stats.carves += 1;
            stack.push(next);
        }
    }

    stats
}

/// Knock out interior walls with `probability` to add loops.
///
/// Candidates are the walls touching an open cell before braiding starts, so
/// every opened cell joins the existing corridor network and each candidate
/// is rolled independently. Wall cells with no open neighbour are never
/// knocked out. Must run after the backtracker has finished.
pub fn braid<R: Rng + ?Sized>(grid: &mut Grid, probability: f64, rng: &mut R) -> usize {
    let Some(interior) = grid.interior() else {
        return 0;
    };
    let candidates: Vec<Coord> = interior
        .cells()
        .filter(|cell| grid.at(*cell) == Tile::Wall)
        .filter(|cell| grid.neighbors4(*cell).any(|n| grid.at(n).is_walkable()))
        .collect();

    let mut removed = 0;
    for cell in candidates {
        if rng.gen_bool(probability) {
            grid.put(cell, Tile::Empty);
            removed += 1;
        }
    }
    removed
}

/// Round even dimensions up so the one-wide lattice fits exactly.
pub fn normalize_dims(rows: usize, cols: usize) -> (usize, usize) {
    let odd = |n: usize| if n % 2 == 0 { n + 1 } else { n };
    (odd(rows), odd(cols))
}

/// Perfect maze, before braiding.
pub fn carve_perfect_maze<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Result<(Grid, MazeStats), GenerationError> {
    ensure_min_size("maze", rows, cols, MAZE_MIN_SIZE, MAZE_MIN_SIZE)?;
    let (rows, cols) = normalize_dims(rows, cols);
    let mut grid = Grid::filled_with_walls(rows, cols)?;
    let stats = match Lattice::narrow(&grid) {
        Some(lattice) => carve_lattice(&mut grid, &lattice, rng),
        None => MazeStats::default(),
    };
    Ok((grid, stats))
}

/// Braided maze: the standalone maze generator.
pub fn generate_maze<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    braid_probability: f64,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    let (mut grid, stats) = carve_perfect_maze(rows, cols, rng)?;
    let removed = braid(&mut grid, braid_probability, rng);
    grid.seal_border();
    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        carves = stats.carves,
        braided = removed,
        "maze carved"
    );
    Ok(grid)
}

/// Number of 4-adjacent walkable pairs; a tree has exactly `open - 1`.
pub fn open_adjacency_count(grid: &Grid) -> usize {
    let mut edges = 0;
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            if !grid.is_walkable(r, c) {
                continue;
            }
            if r + 1 < grid.rows() && grid.is_walkable(r + 1, c) {
                edges += 1;
            }
            if c + 1 < grid.cols() && grid.is_walkable(r, c + 1) {
                edges += 1;
            }
        }
    }
    edges
}

/// Cell the narrow maze always starts from.
pub const MAZE_START: Coord = Coord::new(1, 1);
