//! Round pipeline
//!
//! The round controller calls [`ArenaEngine::generate_round`] at round start,
//! on an explicit map change, and on reset. Each call:
//!   1. picks a generator (by name, or at random for the size class)
//!   2. generates the grid from the round's RNG
//!   3. checks the border contract
//!   4. analyzes connectivity and applies the generator's repair policy
//!   5. optionally dresses terrain
//!   6. collects spawn points from the dominant region

pub mod arena;
pub mod config;

pub use arena::{ArenaEngine, MapRequest, RoundMap};
pub use config::{ConfigError, EngineConfig, MazeParams};

// =====================================================
// Tests
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::analyze;
    use crate::generation::registry::StaticMap;
    use crate::generation::{rng_from_seed, GenerationError, SizeClass};
    use crate::grid::{Grid, GridError, Tile};

    fn test_engine() -> ArenaEngine {
        ArenaEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = test_engine();
        assert_eq!(engine.seed().seed, 42);
        assert_eq!(engine.registry.len(), 6);
    }

    #[test]
    fn test_engine_installs_logging() {
        let _engine = test_engine();
        assert!(crate::logging::tracing_initialized());
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = EngineConfig {
            spawn_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(ArenaEngine::new(config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_round_deterministic() {
        let engine = test_engine();
        let request = MapRequest::random(SizeClass::Medium);
        let a = engine.generate_round(5, &request).unwrap();
        let b = engine.generate_round(5, &request).unwrap();
        assert_eq!(a.generator, b.generator);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.spawn_points, b.spawn_points);
    }

    #[test]
    fn test_every_builtin_yields_single_region() {
        let engine = test_engine();
        for name in ["maze", "cave", "tunnels", "office", "backrooms"] {
            for round in 0..3 {
                let map = engine
                    .generate_round(round, &MapRequest::named(name, SizeClass::Medium))
                    .unwrap();
                assert_eq!(map.generator, name);
                assert!(map.grid.check_border().is_ok());
                let regions = analyze(&map.grid);
                assert_eq!(regions.len(), 1, "{name} round {round}");
                assert_eq!(map.spawn_points.len(), regions[0].len());
            }
        }
    }

    #[test]
    fn test_unknown_generator() {
        let engine = test_engine();
        let err = engine
            .generate_round(1, &MapRequest::named("volcano", SizeClass::Small))
            .unwrap_err();
        assert_eq!(err, GenerationError::UnknownGenerator("volcano".into()));
    }

    #[test]
    fn test_border_breach_falls_back_to_default() {
        let mut engine = test_engine();
        let leaky = Grid::new(5, 5, Tile::Empty).unwrap();
        engine.register(Box::new(StaticMap::new("leaky", leaky)));

        let request = MapRequest::named("leaky", SizeClass::Small);
        assert!(matches!(
            engine.generate_round(1, &request),
            Err(GenerationError::Grid(GridError::BorderBreach { row: 0, col: 0, .. }))
        ));

        let map = engine.generate_round_or_default(1, &request).unwrap();
        assert_eq!(map.generator, "default");
        assert_eq!((map.grid.rows(), map.grid.cols()), (31, 31));
        assert_eq!(map.spawn_points.len(), 29 * 29);
    }

    #[test]
    fn test_spawn_lands_on_spawn_points() {
        let engine = test_engine();
        let map = engine
            .generate_round(2, &MapRequest::named("cave", SizeClass::Small))
            .unwrap();
        let mut rng = rng_from_seed(9);
        let tile = engine.config.tile_size;
        for _ in 0..50 {
            let pos = map.spawn(&mut rng);
            let cell = crate::grid::Coord::new((pos.y / tile) as usize, (pos.x / tile) as usize);
            assert!(map.spawn_points.contains(&cell));
        }
    }

    #[test]
    fn test_terrain_dressing_keeps_connectivity() {
        let mut config = EngineConfig::default();
        config.terrain.enabled = true;
        config.terrain.cells_per_patch = 40;
        let engine = ArenaEngine::new(config).unwrap();
        let map = engine
            .generate_round(3, &MapRequest::named("office", SizeClass::Large))
            .unwrap();
        assert!(map.grid.count(Tile::Mud) + map.grid.count(Tile::Ice) > 0);
        assert_eq!(analyze(&map.grid).len(), 1);
        for cell in &map.spawn_points {
            assert!(map.grid.at(*cell).is_walkable());
        }
    }

    #[test]
    fn test_round_map_wire_json() {
        let engine = test_engine();
        let map = engine.default_round(0, SizeClass::Small).unwrap();
        let parsed = Grid::from_json(&map.to_json()).unwrap();
        assert_eq!(parsed, map.grid);
    }
}
