//! Byte encodings for persisted blocks.
//!
//! `encode`/`decode` are the store format: bincode, which length-prefixes the
//! payload and writes every other field at a fixed width, so all block fields
//! round-trip. The `compact` pair is the minimal predecessor-plus-payload
//! layout. It drops the timestamp, difficulty, nonce and hash and is kept for
//! interop only.

use crate::block::Block;
use crate::constants::HASH_SIZE;
use crate::error::{ChainError, Result};
use crate::hash::Hash;

pub fn encode(block: &Block) -> Result<Vec<u8>> {
    Ok(bincode::serialize(block)?)
}

pub fn decode(bytes: &[u8]) -> Result<Block> {
    Ok(bincode::deserialize(bytes)?)
}

/// What survives the compact layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactBlock {
    pub prev_hash: Option<Hash>,
    pub payload: Vec<u8>,
}

/// 32-byte predecessor field (zeros for genesis) followed by the raw payload.
pub fn encode_compact(block: &Block) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HASH_SIZE + block.payload.len());
    bytes.extend_from_slice(&block.prev_hash.unwrap_or([0u8; HASH_SIZE]));
    bytes.extend_from_slice(&block.payload);
    bytes
}

pub fn decode_compact(bytes: &[u8]) -> Result<CompactBlock> {
    if bytes.len() < HASH_SIZE {
        return Err(ChainError::Encoding(format!(
            "compact block needs at least {HASH_SIZE} bytes, got {}",
            bytes.len()
        )));
    }
    let (prev, payload) = bytes.split_at(HASH_SIZE);
    let mut prev_hash = [0u8; HASH_SIZE];
    prev_hash.copy_from_slice(prev);
    Ok(CompactBlock {
        prev_hash: (prev_hash != [0u8; HASH_SIZE]).then_some(prev_hash),
        payload: payload.to_vec(),
    })
}
