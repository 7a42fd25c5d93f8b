//! Safe-spawn selection.
//!
//! With a precomputed list of valid points the pick is a single uniform
//! draw from it. Without one, random cells are sampled up to a fixed budget;
//! if every sample is blocked the fixed fallback coordinate is returned and
//! the anomaly is logged.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::connectivity::Region;
use crate::constants::{SPAWN_FALLBACK, SPAWN_MAX_ATTEMPTS, TILE_SIZE};
use crate::engine::config::EngineConfig;
use crate::grid::{Coord, Grid};

/// Position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnSource {
    Precomputed,
    Sampled,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPick {
    pub coord: Coord,
    pub source: SpawnSource,
}

/// Every cell of the dominant region; empty when the grid has no floor.
pub fn valid_spawn_points(regions: &[Region]) -> Vec<Coord> {
    regions.first().map(|r| r.cells.clone()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSelector {
    pub tile_size: f32,
    pub max_attempts: usize,
    pub fallback: Coord,
}

impl Default for SpawnSelector {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            max_attempts: SPAWN_MAX_ATTEMPTS,
            fallback: Coord::new(SPAWN_FALLBACK.0, SPAWN_FALLBACK.1),
        }
    }
}

impl SpawnSelector {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tile_size: config.tile_size,
            max_attempts: config.spawn_attempts,
            ..Default::default()
        }
    }

    pub fn pick_tile<R: Rng + ?Sized>(&self, grid: &Grid, valid: Option<&[Coord]>, rng: &mut R) -> SpawnPick {
        if let Some(&coord) = valid.and_then(|points| points.choose(rng)) {
            return SpawnPick {
                coord,
                source: SpawnSource::Precomputed,
            };
        }

        for _ in 0..self.max_attempts {
            let coord = Coord::new(rng.gen_range(0..grid.rows()), rng.gen_range(0..grid.cols()));
            if grid.at(coord).is_walkable() {
                return SpawnPick {
                    coord,
                    source: SpawnSource::Sampled,
                };
            }
        }

        warn!(
            attempts = self.max_attempts,
            rows = grid.rows(),
            cols = grid.cols(),
            walkable = grid.walkable_count(),
            "no walkable spawn found, using fallback"
        );
        SpawnPick {
            coord: self.fallback,
            source: SpawnSource::Fallback,
        }
    }

    pub fn to_pixel(&self, coord: Coord) -> PixelPos {
        PixelPos {
            x: coord.col as f32 * self.tile_size,
            y: coord.row as f32 * self.tile_size,
        }
    }

    /// Spawn query used for player joins, bot spawns and item respawns.
    pub fn get_spawn<R: Rng + ?Sized>(&self, grid: &Grid, valid: Option<&[Coord]>, rng: &mut R) -> PixelPos {
        self.to_pixel(self.pick_tile(grid, valid, rng).coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::analyze;
    use crate::generation::rng_from_seed;
    use crate::grid::Tile;

    #[test]
    fn test_precomputed_points_only() {
        let grid = Grid::filled_with_walls(10, 10).unwrap();
        let points = [Coord::new(2, 3), Coord::new(7, 7)];
        let selector = SpawnSelector::default();
        let mut rng = rng_from_seed(1);
        for _ in 0..100 {
            let pick = selector.pick_tile(&grid, Some(&points[..]), &mut rng);
            assert_eq!(pick.source, SpawnSource::Precomputed);
            assert!(points.contains(&pick.coord));
        }
    }

    #[test]
    fn test_empty_list_falls_through_to_sampling() {
        let mut grid = Grid::new(8, 8, Tile::Empty).unwrap();
        grid.seal_border();
        let selector = SpawnSelector::default();
        let mut rng = rng_from_seed(2);
        let pick = selector.pick_tile(&grid, Some(&[][..]), &mut rng);
        assert_eq!(pick.source, SpawnSource::Sampled);
        assert!(grid.at(pick.coord).is_walkable());
    }

    #[test]
    fn test_sampling_avoids_hazard() {
        let mut grid = Grid::new(6, 6, Tile::Hazard).unwrap();
        grid.seal_border();
        grid.set(3, 3, Tile::Mud);
        let selector = SpawnSelector {
            max_attempts: 10_000,
            ..Default::default()
        };
        let mut rng = rng_from_seed(3);
        let pick = selector.pick_tile(&grid, None, &mut rng);
        assert_eq!(pick.coord, Coord::new(3, 3));
    }

    #[test]
    fn test_solid_grid_uses_fallback() {
        let grid = Grid::filled_with_walls(12, 12).unwrap();
        let selector = SpawnSelector::default();
        let mut rng = rng_from_seed(4);
        let pick = selector.pick_tile(&grid, None, &mut rng);
        assert_eq!(pick.source, SpawnSource::Fallback);
        assert_eq!(pick.coord, Coord::new(1, 1));
        assert_eq!(selector.get_spawn(&grid, None, &mut rng), PixelPos { x: 32.0, y: 32.0 });
    }

    #[test]
    fn test_pixel_conversion() {
        let selector = SpawnSelector {
            tile_size: 16.0,
            ..Default::default()
        };
        assert_eq!(selector.to_pixel(Coord::new(2, 5)), PixelPos { x: 80.0, y: 32.0 });
    }

    #[test]
    fn test_valid_points_are_dominant_region() {
        let mut grid = Grid::filled_with_walls(7, 9).unwrap();
        grid.fill_rect(crate::grid::Rect::new(1, 1, 5, 4), Tile::Empty);
        grid.set(1, 7, Tile::Empty);
        let regions = analyze(&grid);
        let points = valid_spawn_points(&regions);
        assert_eq!(points.len(), 20);
        assert!(!points.contains(&Coord::new(1, 7)));
        assert!(valid_spawn_points(&[]).is_empty());
    }
}
