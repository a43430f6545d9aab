use serde::{Deserialize, Serialize};

use crate::constants::{GENESIS_PAYLOAD, MAX_NONCE, POW_TARGET_DIFFICULTY};
use crate::error::Result;
use crate::hash::target_for;

/// Mining parameters fixed for the lifetime of a `Chain` handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Leading-zero bits required of every appended block.
    pub difficulty_bits: u32,
    pub genesis_difficulty_bits: u32,
    pub genesis_payload: String,
    /// Highest nonce tried before giving up with `MiningExhausted`.
    pub max_nonce: u64,
    /// Spread the nonce search over the rayon pool.
    pub parallel: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: POW_TARGET_DIFFICULTY,
            genesis_difficulty_bits: POW_TARGET_DIFFICULTY,
            genesis_payload: GENESIS_PAYLOAD.to_string(),
            max_nonce: MAX_NONCE,
            parallel: false,
        }
    }
}

impl ChainConfig {
    /// Same difficulty for genesis and appended blocks.
    pub fn with_difficulty(difficulty_bits: u32) -> Self {
        Self {
            difficulty_bits,
            genesis_difficulty_bits: difficulty_bits,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        target_for(self.difficulty_bits)?;
        target_for(self.genesis_difficulty_bits)?;
        Ok(())
    }
}
