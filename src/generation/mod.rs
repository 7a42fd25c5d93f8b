//! Arena generation: seeding, the shared error type, and the per-strategy
//! carvers.
//!
//! Every generator draws from an injected [`GenRng`]. A round's RNG is derived
//! from the arena seed and the round number, so the same (seed, round) pair
//! always produces the same map.

pub mod backrooms;
pub mod cave;
pub mod maze;
pub mod office;
pub mod registry;
pub mod terrain;
pub mod tunnels;
pub mod zones;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::grid::GridError;

pub use registry::{GeneratorRegistry, MapGenerator, StaticMap};

/// RNG used by every generator.
pub type GenRng = Xoshiro256PlusPlus;

/// Root of all procedural generation for one arena instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaSeed {
    pub seed: u64,
}

impl Default for ArenaSeed {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl ArenaSeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Deterministic round hash from arena seed and round number
    pub fn round_hash(&self, round: u32) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(round.to_le_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[0..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for_round(&self, round: u32) -> GenRng {
        GenRng::seed_from_u64(self.round_hash(round))
    }
}

/// Convenience for tests and one-off generation.
pub fn rng_from_seed(seed: u64) -> GenRng {
    GenRng::seed_from_u64(seed)
}

/// Fixed size catalogue the round controller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn all() -> &'static [SizeClass] {
        &[SizeClass::Small, SizeClass::Medium, SizeClass::Large]
    }

    /// (rows, cols)
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            SizeClass::Small => (31, 31),
            SizeClass::Medium => (45, 45),
            SizeClass::Large => (61, 61),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("{generator} needs at least {min_rows}x{min_cols}, got {rows}x{cols}")]
    TooSmall {
        generator: &'static str,
        rows: usize,
        cols: usize,
        min_rows: usize,
        min_cols: usize,
    },
    #[error("no generator named {0:?}")]
    UnknownGenerator(String),
    #[error("no selectable generators registered")]
    EmptyRegistry,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Reject dimensions below a generator's minimum viable size.
pub(crate) fn ensure_min_size(
    generator: &'static str,
    rows: usize,
    cols: usize,
    min_rows: usize,
    min_cols: usize,
) -> Result<(), GenerationError> {
    if rows < min_rows || cols < min_cols {
        return Err(GenerationError::TooSmall {
            generator,
            rows,
            cols,
            min_rows,
            min_cols,
        });
    }
    Ok(())
}
