//! Arena Game - Procedural Core Library
//!
//! Tile-grid generation and connectivity guarantees for a top-down arena:
//! - Tile grid and its wire format (rows of tile codes)
//! - Generators: braided maze, cellular-automata cave, worm tunnels,
//!   partitioned office, zone-composite backrooms
//! - Generator registry with size classes and test-only maps
//! - Connectivity analysis and region repair
//! - Safe-spawn selection
//! - Round pipeline tying it together, seeded per round

pub mod connectivity;
pub mod constants;
pub mod engine;
pub mod generation;
pub mod grid;
pub mod logging;
pub mod spawn;
pub mod visualization;

pub use connectivity::{analyze, Region, RepairPolicy, RepairReport};
pub use engine::{ArenaEngine, EngineConfig, MapRequest, RoundMap};
pub use generation::{ArenaSeed, GenRng, GenerationError, SizeClass};
pub use grid::{Coord, Grid, GridError, Rect, Tile};
pub use spawn::{PixelPos, SpawnSelector};
