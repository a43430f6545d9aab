use thiserror::Error;

use crate::constants::HASH_BITS;

/// Errors surfaced by mining, encoding and the chain stores.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("nonce space exhausted after {max_nonce} without meeting the target")]
    MiningExhausted { max_nonce: u64 },

    #[error("difficulty must be within 1..={max} bits, got {0}", max = HASH_BITS)]
    InvalidDifficulty(u32),
}

impl ChainError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        ChainError::StorageUnavailable(err.to_string())
    }

    pub fn encoding(err: impl std::fmt::Display) -> Self {
        ChainError::Encoding(err.to_string())
    }
}

impl From<bincode::Error> for ChainError {
    fn from(err: bincode::Error) -> Self {
        ChainError::encoding(err)
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
