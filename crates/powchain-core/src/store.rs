use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::block::Block;
use crate::error::{ChainError, Result};
use crate::hash::Hash;

/// Trait the storage backends implement for the chain to operate.
/// This lives in `powchain-core` to avoid a circular dependency.
pub trait ChainStore: Send + Sync {
    /// Block stored under `hash`, if any.
    fn get_block(&self, hash: &Hash) -> Result<Option<Block>>;
    /// Hash of the newest block; `None` for an empty store.
    fn tip(&self) -> Result<Option<Hash>>;
    /// Store `block` and make it the tip in one atomic step. An error does not
    /// imply the tip is unchanged if the backend failed only after committing.
    fn append(&self, block: &Block) -> Result<()>;
    fn close(&self) -> Result<()>;
}

/// Volatile store. Blocks live only as long as the handle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    blocks: HashMap<Hash, Block>,
    tip: Option<Hash>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> ChainError {
    ChainError::storage("memory store lock poisoned")
}

impl ChainStore for MemoryStore {
    fn get_block(&self, hash: &Hash) -> Result<Option<Block>> {
        let state = self.inner.read().map_err(poisoned)?;
        Ok(state.blocks.get(hash).cloned())
    }

    fn tip(&self) -> Result<Option<Hash>> {
        Ok(self.inner.read().map_err(poisoned)?.tip)
    }

    fn append(&self, block: &Block) -> Result<()> {
        let mut state = self.inner.write().map_err(poisoned)?;
        state.blocks.insert(block.hash, block.clone());
        state.tip = Some(block.hash);
        debug!(hash = %block.hash_hex(), "appended block in memory");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
