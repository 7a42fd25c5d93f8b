//! ASCII rendering of arena grids.
//!
//! Used for debug logging and for readable assertion failures in tests.
//! Each tile class gets a distinct glyph; spawn points can be overlaid.

use std::collections::HashSet;

use crate::grid::{Coord, Grid, Tile};

const SPAWN_GLYPH: char = 'S';

pub fn tile_glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::Wall => '#',
        Tile::Mud => '~',
        Tile::Ice => '_',
        Tile::Hazard => '!',
    }
}

/// One line per row, newline-terminated.
pub fn render_ascii(grid: &Grid, spawns: Option<&[Coord]>) -> String {
    let marked: HashSet<Coord> = spawns.into_iter().flatten().copied().collect();
    let mut out = String::with_capacity(grid.rows() * (grid.cols() + 1));
    for r in 0..grid.rows() {
        for (c, tile) in grid.row_slice(r).iter().enumerate() {
            if marked.contains(&Coord::new(r, c)) {
                out.push(SPAWN_GLYPH);
            } else {
                out.push(tile_glyph(*tile));
            }
        }
        out.push('\n');
    }
    out
}
