use rand::Rng;
use tracing::{debug, error, info};

use crate::connectivity::{analyze_and_repair, RepairReport};
use crate::engine::config::{ConfigError, EngineConfig};
use crate::generation::registry::{GeneratorRegistry, MapGenerator, StaticMap};
use crate::generation::terrain::dress_terrain;
use crate::generation::{ArenaSeed, GenerationError, SizeClass};
use crate::grid::{Coord, Grid};
use crate::logging::init_tracing;
use crate::spawn::{valid_spawn_points, PixelPos, SpawnSelector};

/// What the round controller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRequest {
    /// Explicit generator name; `None` picks one at random.
    pub generator: Option<String>,
    pub size: SizeClass,
}

impl MapRequest {
    pub fn random(size: SizeClass) -> Self {
        Self { generator: None, size }
    }

    pub fn named(name: impl Into<String>, size: SizeClass) -> Self {
        Self {
            generator: Some(name.into()),
            size,
        }
    }
}

/// A published arena: repaired grid plus the spawn points of its dominant
/// region.
#[derive(Debug, Clone)]
pub struct RoundMap {
    pub round: u32,
    pub generator: String,
    pub grid: Grid,
    pub spawn_points: Vec<Coord>,
    pub repair: RepairReport,
    selector: SpawnSelector,
}

impl RoundMap {
    /// Pixel-space spawn position on this map.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> PixelPos {
        self.selector.get_spawn(&self.grid, Some(self.spawn_points.as_slice()), rng)
    }

    /// Wire format of the grid.
    pub fn to_json(&self) -> String {
        self.grid.to_json()
    }
}

/// Runs the per-round pipeline: select, generate, check, repair, dress,
/// collect spawn points.
pub struct ArenaEngine {
    pub config: EngineConfig,
    pub registry: GeneratorRegistry,
    pub spawns: SpawnSelector,
    seed: ArenaSeed,
}

impl ArenaEngine {
    /// Validate `config` and install its tracing subscriber. Only the first
    /// subscriber installed in a process takes effect.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        init_tracing(&config.logging);
        Ok(Self {
            registry: GeneratorRegistry::with_builtins(&config),
            spawns: SpawnSelector::from_config(&config),
            seed: ArenaSeed::new(config.seed),
            config,
        })
    }

    pub fn seed(&self) -> ArenaSeed {
        self.seed
    }

    pub fn register(&mut self, generator: Box<dyn MapGenerator>) {
        self.registry.register(generator);
    }

    /// Generate the map for `round`. The same seed, round and request always
    /// give the same map.
    pub fn generate_round(&self, round: u32, request: &MapRequest) -> Result<RoundMap, GenerationError> {
        let mut rng = self.seed.rng_for_round(round);
        let generator = match &request.generator {
            Some(name) => self.registry.get(name)?,
            None => self.registry.select(request.size, &mut rng)?,
        };
        let (rows, cols) = request.size.dimensions();
        debug!(round, generator = generator.name(), rows, cols, "generating round map");

        let mut grid = generator.generate(rows, cols, &mut rng)?;
        grid.check_border()?;

        let (repair, regions) = analyze_and_repair(&mut grid, generator.repair_policy());
        if self.config.terrain.enabled {
            dress_terrain(&mut grid, &self.config.terrain, &mut rng);
        }
        let spawn_points = valid_spawn_points(&regions);

        info!(
            round,
            generator = generator.name(),
            rows = grid.rows(),
            cols = grid.cols(),
            regions = regions.len(),
            spawn_points = spawn_points.len(),
            fill = grid.fill_ratio(),
            "round map ready"
        );
        Ok(RoundMap {
            round,
            generator: generator.name().to_string(),
            grid,
            spawn_points,
            repair,
            selector: self.spawns,
        })
    }

    /// [`generate_round`](Self::generate_round), publishing the default open
    /// room when generation fails. Only errors if the default map itself
    /// cannot be built.
    pub fn generate_round_or_default(&self, round: u32, request: &MapRequest) -> Result<RoundMap, GenerationError> {
        match self.generate_round(round, request) {
            Ok(map) => Ok(map),
            Err(err) => {
                error!(round, %err, "generation failed, publishing default map");
                self.default_round(round, request.size)
            }
        }
    }

    pub fn default_round(&self, round: u32, size: SizeClass) -> Result<RoundMap, GenerationError> {
        let (rows, cols) = size.dimensions();
        let map = StaticMap::open_room(rows, cols)?;
        let mut grid = map.grid().clone();
        let (repair, regions) = analyze_and_repair(&mut grid, map.repair_policy());
        Ok(RoundMap {
            round,
            generator: map.name().to_string(),
            spawn_points: valid_spawn_points(&regions),
            grid,
            repair,
            selector: self.spawns,
        })
    }
}
