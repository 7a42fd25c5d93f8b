use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::generation::backrooms::BackroomsParams;
use crate::generation::cave::CaveParams;
use crate::generation::office::OfficeParams;
use crate::generation::terrain::TerrainParams;
use crate::generation::tunnels::WormParams;
use crate::logging::TracingConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("failed to write RON config: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension {0:?} (expected .ron or .json)")]
    UnknownFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeParams {
    pub braid_probability: f64,
}

impl Default for MazeParams {
    fn default() -> Self {
        Self {
            braid_probability: MAZE_BRAID_PROBABILITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    /// Pixel edge length of one tile
    pub tile_size: f32,
    /// Random samples the spawn fallback may draw
    pub spawn_attempts: usize,
    /// Cave regions below this size are sealed during repair; backrooms
    /// carries its own floor
    pub min_region_size: usize,
    pub maze: MazeParams,
    pub cave: CaveParams,
    pub worm: WormParams,
    pub office: OfficeParams,
    pub backrooms: BackroomsParams,
    pub terrain: TerrainParams,
    pub logging: TracingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tile_size: TILE_SIZE,
            spawn_attempts: SPAWN_MAX_ATTEMPTS,
            min_region_size: MIN_REGION_SIZE,
            maze: MazeParams::default(),
            cave: CaveParams::default(),
            worm: WormParams::default(),
            office: OfficeParams::default(),
            backrooms: BackroomsParams::default(),
            terrain: TerrainParams::default(),
            logging: TracingConfig::default(),
        }
    }
}

fn probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn at_least(name: &str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be at least {min}, got {value}")))
    }
}

fn at_most(name: &str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be at most {max}, got {value}")))
    }
}

impl EngineConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.ron` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnknownFormat(other.unwrap_or_default().to_string())),
        }
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no generator can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        at_least("spawn_attempts", self.spawn_attempts, 1)?;
        at_least("min_region_size", self.min_region_size, 1)?;

        probability("maze.braid_probability", self.maze.braid_probability)?;

        probability("cave.wall_probability", self.cave.wall_probability)?;
        if self.cave.solidify_threshold > 8 {
            return Err(ConfigError::Invalid(format!(
                "cave.solidify_threshold must be at most 8, got {}",
                self.cave.solidify_threshold
            )));
        }

        probability("worm.target_fill", self.worm.target_fill)?;
        probability("worm.straight_bias", self.worm.straight_bias)?;
        probability("worm.thicken_chance", self.worm.thicken_chance)?;
        probability("worm.spawn_chance", self.worm.spawn_chance)?;
        at_least("worm.max_agents", self.worm.max_agents, 1)?;

        at_least("office.min_room_size", self.office.min_room_size, 3)?;
        probability("office.pillar_chance", self.office.pillar_chance)?;
        probability("office.extra_link_share", self.office.extra_link_share)?;

        let b = &self.backrooms;
        at_least("backrooms.zone_min_side", b.zone_min_side, 5)?;
        at_least("backrooms.zone_max_side", b.zone_max_side, b.zone_min_side)?;
        at_least("backrooms.base_width", b.base_width, 1)?;
        at_least("backrooms.wide_width", b.wide_width, 1)?;
        at_least("backrooms.zone_area", b.zone_area, 1)?;
        at_least("backrooms.min_region_size", b.min_region_size, 1)?;
        at_most("backrooms.zone_buffer", b.zone_buffer, b.zone_max_side)?;
        probability("backrooms.open_speckle", b.open_speckle)?;

        probability("terrain.ice_share", self.terrain.ice_share)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = EngineConfig::from_ron_str("(seed: 7, maze: (braid_probability: 0.3))").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.maze.braid_probability, 0.3);
        assert_eq!(config.spawn_attempts, SPAWN_MAX_ATTEMPTS);
        assert_eq!(config.cave, CaveParams::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig {
            seed: 99,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = EngineConfig::default();
        let ron = config.to_ron().unwrap();
        assert_eq!(EngineConfig::from_ron_str(&ron).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = EngineConfig::from_json_str(r#"{"cave": {"wall_probability": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("cave.wall_probability")));
    }

    #[test]
    fn test_rejects_zero_tile_size() {
        let config = EngineConfig {
            tile_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_inverted_zone_sides() {
        let mut config = EngineConfig::default();
        config.backrooms.zone_min_side = 12;
        config.backrooms.zone_max_side = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_zone_buffer() {
        let err = EngineConfig::from_ron_str("(backrooms: (zone_buffer: 18446744073709551615))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("backrooms.zone_buffer")));

        let at_cap = format!("(backrooms: (zone_buffer: {ZONE_MAX_SIDE}))");
        assert!(EngineConfig::from_ron_str(&at_cap).is_ok());
    }

    #[test]
    fn test_rejects_zero_backrooms_region_floor() {
        let mut config = EngineConfig::default();
        config.backrooms.min_region_size = 0;
        assert!(config.validate().is_err());
    }
}
