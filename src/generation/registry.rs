//! Generator contract and the registry the round controller selects from.

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use super::backrooms::{generate_backrooms, BackroomsParams};
use super::cave::{generate_cave, CaveParams};
use super::maze::generate_maze;
use super::office::{generate_office, OfficeParams};
use super::tunnels::{generate_tunnels, WormParams};
use super::{GenRng, GenerationError, SizeClass};
use crate::connectivity::RepairPolicy;
use crate::engine::config::{EngineConfig, MazeParams};
use crate::grid::{Grid, GridError, Tile};

/// A named map source: either procedural or a fixed grid.
pub trait MapGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Size classes this generator accepts; `None` means all of them.
    fn allowed_sizes(&self) -> Option<&[SizeClass]> {
        None
    }

    /// Test-only generators are never picked at random.
    fn is_test(&self) -> bool {
        false
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError>;

    /// What the engine does with regions outside the dominant one.
    fn repair_policy(&self) -> RepairPolicy {
        RepairPolicy::Seal
    }

    fn accepts(&self, size: SizeClass) -> bool {
        self.allowed_sizes().map_or(true, |sizes| sizes.contains(&size))
    }
}

pub struct MazeGenerator {
    pub params: MazeParams,
}

impl MapGenerator for MazeGenerator {
    fn name(&self) -> &str {
        "maze"
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError> {
        generate_maze(rows, cols, self.params.braid_probability, rng)
    }
}

pub struct CaveGenerator {
    pub params: CaveParams,
    pub min_region_size: usize,
}

impl MapGenerator for CaveGenerator {
    fn name(&self) -> &str {
        "cave"
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError> {
        generate_cave(rows, cols, &self.params, rng)
    }

    fn repair_policy(&self) -> RepairPolicy {
        RepairPolicy::ReconnectOrSeal {
            min_size: self.min_region_size,
        }
    }
}

pub struct TunnelGenerator {
    pub params: WormParams,
}

impl MapGenerator for TunnelGenerator {
    fn name(&self) -> &str {
        "tunnels"
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError> {
        generate_tunnels(rows, cols, &self.params, rng)
    }
}

pub struct OfficeGenerator {
    pub params: OfficeParams,
}

impl MapGenerator for OfficeGenerator {
    fn name(&self) -> &str {
        "office"
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError> {
        generate_office(rows, cols, &self.params, rng)
    }
}

pub struct BackroomsGenerator {
    pub params: BackroomsParams,
}

impl MapGenerator for BackroomsGenerator {
    fn name(&self) -> &str {
        "backrooms"
    }

    /// Zones need room to breathe; small arenas would be all base maze.
    fn allowed_sizes(&self) -> Option<&[SizeClass]> {
        Some(&[SizeClass::Medium, SizeClass::Large])
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut GenRng) -> Result<Grid, GenerationError> {
        generate_backrooms(rows, cols, &self.params, rng)
    }

    fn repair_policy(&self) -> RepairPolicy {
        RepairPolicy::ReconnectOrSeal {
            min_size: self.params.min_region_size,
        }
    }
}

/// Fixed grid shipped as data. Ignores the requested dimensions.
#[derive(Debug, Clone)]
pub struct StaticMap {
    name: String,
    grid: Grid,
    sizes: Option<Vec<SizeClass>>,
    test: bool,
}

impl StaticMap {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
            sizes: None,
            test: false,
        }
    }

    /// Parse the wire format (rows of tile codes).
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(name, Grid::from_json(json)?))
    }

    pub fn with_sizes(mut self, sizes: &[SizeClass]) -> Self {
        self.sizes = Some(sizes.to_vec());
        self
    }

    pub fn test_only(mut self) -> Self {
        self.test = true;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Walled empty room; the map published when generation fails.
    pub fn open_room(rows: usize, cols: usize) -> Result<Self, GridError> {
        let mut grid = Grid::new(rows, cols, Tile::Empty)?;
        grid.seal_border();
        Ok(Self::new("default", grid))
    }

    /// Small hand-made arena with one of every tile class, for tests.
    pub fn training_room() -> Result<Self, GridError> {
        const ROWS: [[u8; 11]; 9] = [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 2, 2, 2, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 3, 3, 0, 4, 0, 3, 3, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 2, 2, 2, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];
        let rows: Vec<Vec<u8>> = ROWS.iter().map(|row| row.to_vec()).collect();
        Ok(Self::new("training_room", Grid::from_rows(&rows)?).test_only())
    }
}

impl MapGenerator for StaticMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn allowed_sizes(&self) -> Option<&[SizeClass]> {
        self.sizes.as_deref()
    }

    fn is_test(&self) -> bool {
        self.test
    }

    fn generate(&self, _rows: usize, _cols: usize, _rng: &mut GenRng) -> Result<Grid, GenerationError> {
        Ok(self.grid.clone())
    }
}

/// All known generators, in registration order.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn MapGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every procedural generator plus the training room.
    pub fn with_builtins(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MazeGenerator {
            params: config.maze.clone(),
        }));
        registry.register(Box::new(CaveGenerator {
            params: config.cave.clone(),
            min_region_size: config.min_region_size,
        }));
        registry.register(Box::new(TunnelGenerator {
            params: config.worm.clone(),
        }));
        registry.register(Box::new(OfficeGenerator {
            params: config.office.clone(),
        }));
        registry.register(Box::new(BackroomsGenerator {
            params: config.backrooms.clone(),
        }));
        match StaticMap::training_room() {
            Ok(room) => registry.register(Box::new(room)),
            Err(err) => warn!(%err, "training room unavailable"),
        }
        registry
    }

    /// Add a generator, replacing any existing one with the same name.
    pub fn register(&mut self, generator: Box<dyn MapGenerator>) {
        match self.generators.iter().position(|g| g.name() == generator.name()) {
            Some(idx) => {
                debug!(name = generator.name(), "generator replaced");
                self.generators[idx] = generator;
            }
            None => self.generators.push(generator),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn MapGenerator, GenerationError> {
        self.generators
            .iter()
            .find(|g| g.name() == name)
            .map(|g| g.as_ref())
            .ok_or_else(|| GenerationError::UnknownGenerator(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Uniform pick among non-test generators that accept `size`. Falls back
    /// to any non-test generator when none accept it.
    pub fn select(&self, size: SizeClass, rng: &mut GenRng) -> Result<&dyn MapGenerator, GenerationError> {
        let playable: Vec<&dyn MapGenerator> = self
            .generators
            .iter()
            .map(|g| g.as_ref())
            .filter(|g| !g.is_test())
            .collect();
        let sized: Vec<&dyn MapGenerator> = playable.iter().copied().filter(|g| g.accepts(size)).collect();

        let pool = if sized.is_empty() {
            info!(?size, "no generator accepts size, falling back to any");
            playable
        } else {
            sized
        };
        pool.choose(rng).copied().ok_or(GenerationError::EmptyRegistry)
    }
}
