//! Property-based tests using proptest
//!
//! Invariants that must hold for all seeds and sizes:
//! - Every generator: border is wall
//! - Analyzer: regions partition the walkable cells, sorted, deterministic
//! - Repair: a single region remains
//! - Perfect maze: a tree before braiding
//! - Spawn: picks come from the supplied list

use std::collections::HashSet;

use proptest::prelude::*;

use arena_core::connectivity::{analyze, analyze_and_repair, RepairPolicy};
use arena_core::generation::backrooms::{generate_backrooms, BackroomsParams};
use arena_core::generation::cave::{generate_cave, CaveParams};
use arena_core::generation::maze::{carve_perfect_maze, generate_maze, open_adjacency_count};
use arena_core::generation::office::{generate_office, OfficeParams};
use arena_core::generation::rng_from_seed;
use arena_core::generation::tunnels::{generate_tunnels, WormParams};
use arena_core::spawn::{SpawnSelector, SpawnSource};
use arena_core::{ArenaEngine, Coord, EngineConfig, Grid, MapRequest, SizeClass};

fn tile_rows(rows: usize, cols: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..=4, cols), rows)
}

// ============================================================
// Generator Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_maze_border_is_wall(seed in any::<u64>(), rows in 3usize..40, cols in 3usize..40) {
        let mut rng = rng_from_seed(seed);
        let grid = generate_maze(rows, cols, 0.15, &mut rng).unwrap();
        prop_assert!(grid.check_border().is_ok());
        prop_assert_eq!(analyze(&grid).len(), 1);
    }

    #[test]
    fn prop_perfect_maze_is_tree(seed in any::<u64>(), rows in 3usize..35, cols in 3usize..35) {
        let mut rng = rng_from_seed(seed);
        let (grid, stats) = carve_perfect_maze(rows, cols, &mut rng).unwrap();
        prop_assert_eq!(stats.carves + 1, stats.open_lattice_cells);
        prop_assert_eq!(open_adjacency_count(&grid) + 1, grid.walkable_count());
    }

    #[test]
    fn prop_cave_border_is_wall(seed in any::<u64>(), rows in 3usize..50, cols in 3usize..50) {
        let mut rng = rng_from_seed(seed);
        let grid = generate_cave(rows, cols, &CaveParams::default(), &mut rng).unwrap();
        prop_assert!(grid.check_border().is_ok());
    }

    #[test]
    fn prop_tunnels_single_region(seed in any::<u64>(), rows in 5usize..45, cols in 5usize..45) {
        let mut rng = rng_from_seed(seed);
        let grid = generate_tunnels(rows, cols, &WormParams::default(), &mut rng).unwrap();
        prop_assert!(grid.check_border().is_ok());
        prop_assert_eq!(analyze(&grid).len(), 1);
    }

    #[test]
    fn prop_office_single_region(seed in any::<u64>(), rows in 8usize..64, cols in 8usize..64) {
        let mut rng = rng_from_seed(seed);
        let grid = generate_office(rows, cols, &OfficeParams::default(), &mut rng).unwrap();
        prop_assert!(grid.check_border().is_ok());
        prop_assert_eq!(analyze(&grid).len(), 1);
    }

    #[test]
    fn prop_backrooms_single_region(seed in any::<u64>(), rows in 15usize..64, cols in 15usize..64) {
        let mut rng = rng_from_seed(seed);
        let grid = generate_backrooms(rows, cols, &BackroomsParams::default(), &mut rng).unwrap();
        prop_assert!(grid.check_border().is_ok());
        prop_assert_eq!(analyze(&grid).len(), 1);
    }

    #[test]
    fn prop_round_is_reproducible(seed in any::<u64>(), round in 0u32..1000) {
        let engine = ArenaEngine::new(EngineConfig { seed, ..Default::default() }).unwrap();
        let request = MapRequest::random(SizeClass::Small);
        let a = engine.generate_round(round, &request).unwrap();
        let b = engine.generate_round(round, &request).unwrap();
        prop_assert_eq!(a.grid, b.grid);
        prop_assert_eq!(a.spawn_points.len(), b.spawn_points.len());
    }
}

// ============================================================
// Connectivity Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_regions_partition_walkable(rows in tile_rows(12, 14)) {
        let grid = Grid::from_rows(&rows).unwrap();
        let regions = analyze(&grid);

        let mut seen = HashSet::new();
        for region in &regions {
            for cell in &region.cells {
                prop_assert!(grid.at(*cell).is_walkable());
                prop_assert!(seen.insert(*cell), "{:?} appears twice", cell);
            }
        }
        prop_assert_eq!(seen.len(), grid.walkable_count());

        for pair in regions.windows(2) {
            prop_assert!(pair[0].len() >= pair[1].len());
        }
    }

    #[test]
    fn prop_analysis_is_deterministic(rows in tile_rows(10, 10)) {
        let grid = Grid::from_rows(&rows).unwrap();
        let a: Vec<usize> = analyze(&grid).iter().map(|r| r.len()).collect();
        let b: Vec<usize> = analyze(&grid).iter().map(|r| r.len()).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_repair_leaves_one_region(rows in tile_rows(12, 12), min_size in 1usize..30) {
        let mut grid = Grid::from_rows(&rows).unwrap();
        grid.seal_border();
        let (_, regions) = analyze_and_repair(&mut grid, RepairPolicy::ReconnectOrSeal { min_size });
        prop_assert!(regions.len() <= 1);
        prop_assert!(grid.check_border().is_ok());
    }

    #[test]
    fn prop_spawn_from_list(seed in any::<u64>(), points in prop::collection::vec((1usize..19, 1usize..19), 1..8)) {
        let grid = Grid::filled_with_walls(20, 20).unwrap();
        let points: Vec<Coord> = points.into_iter().map(|(r, c)| Coord::new(r, c)).collect();
        let selector = SpawnSelector::default();
        let mut rng = rng_from_seed(seed);
        for _ in 0..20 {
            let pick = selector.pick_tile(&grid, Some(&points[..]), &mut rng);
            prop_assert_eq!(pick.source, SpawnSource::Precomputed);
            prop_assert!(points.contains(&pick.coord));
        }
    }

    #[test]
    fn prop_spawn_sampling_never_blocked(seed in any::<u64>(), rows in tile_rows(8, 8)) {
        let grid = Grid::from_rows(&rows).unwrap();
        let selector = SpawnSelector::default();
        let mut rng = rng_from_seed(seed);
        let pick = selector.pick_tile(&grid, None, &mut rng);
        if pick.source == SpawnSource::Sampled {
            prop_assert!(grid.at(pick.coord).is_walkable());
        } else {
            prop_assert_eq!(pick.coord, Coord::new(1, 1));
        }
    }
}
