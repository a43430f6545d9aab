use std::iter::FusedIterator;

use tracing::{info, warn};

use crate::block::{Block, Candidate};
use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::hash::Hash;
use crate::pow;
use crate::store::{ChainStore, MemoryStore};

/// Hash-linked chain over a `ChainStore`. The store is the source of truth
/// for blocks and the tip; the chain only drives mining and traversal.
///
/// `add_block` takes `&mut self`, so appends through one handle are serialized.
#[derive(Debug)]
pub struct Chain<S: ChainStore> {
    store: S,
    config: ChainConfig,
}

impl Chain<MemoryStore> {
    pub fn in_memory(config: ChainConfig) -> Result<Self> {
        Self::open(MemoryStore::new(), config)
    }
}

impl<S: ChainStore> Chain<S> {
    /// Open a chain on `store`, mining the genesis block if the store is empty.
    pub fn open(store: S, config: ChainConfig) -> Result<Self> {
        config.validate()?;
        let chain = Self { store, config };
        chain.ensure_genesis()?;
        Ok(chain)
    }

    fn ensure_genesis(&self) -> Result<()> {
        if let Some(tip) = self.store.tip()? {
            info!(tip = %hex::encode(tip), "opened existing chain");
            return Ok(());
        }
        let genesis = self.mine(
            None,
            self.config.genesis_payload.clone(),
            self.config.genesis_difficulty_bits,
        )?;
        self.store.append(&genesis)?;
        info!(hash = %genesis.hash_hex(), "created genesis block");
        Ok(())
    }

    fn mine(
        &self,
        prev_hash: Option<Hash>,
        payload: impl Into<Vec<u8>>,
        difficulty_bits: u32,
    ) -> Result<Block> {
        pow::mine(
            Candidate::new(prev_hash, payload),
            difficulty_bits,
            self.config.max_nonce,
            self.config.parallel,
        )
    }

    /// Mine a block on top of the current tip and make it the new tip.
    ///
    /// The tip block itself is loaded from the store before any work is done;
    /// if it cannot be read nothing is mined and nothing is written.
    pub fn add_block(&mut self, payload: impl Into<Vec<u8>>) -> Result<Block> {
        let tip = load(&self.store, &self.tip()?)?;
        let block = self.mine(Some(tip.hash), payload, self.config.difficulty_bits)?;
        self.store.append(&block)?;
        info!(
            hash = %block.hash_hex(),
            nonce = block.nonce,
            payload_len = block.payload.len(),
            "appended block"
        );
        Ok(block)
    }

    pub fn tip(&self) -> Result<Hash> {
        self.store
            .tip()?
            .ok_or_else(|| ChainError::storage("tip is missing from the store"))
    }

    /// Newest-first walk from the current tip back to genesis.
    pub fn iter(&self) -> Result<ChainIter<'_, S>> {
        Ok(ChainIter {
            store: &self.store,
            cursor: Some(self.tip()?),
        })
    }

    /// Every block, oldest first. Loads the whole chain.
    pub fn blocks(&self) -> Result<Vec<Block>> {
        let mut blocks = self.iter()?.collect::<Result<Vec<_>>>()?;
        blocks.reverse();
        Ok(blocks)
    }

    pub fn len(&self) -> Result<usize> {
        self.iter()?.try_fold(0usize, |n, block| block.map(|_| n + 1))
    }

    /// Check hashes, links and proof-of-work for every block.
    ///
    /// Storage and decoding failures are errors; a chain that loads but does
    /// not check out is `Ok(false)`.
    pub fn validate(&self) -> Result<bool> {
        // Walks the store directly: the iterator rejects blocks whose hash does
        // not recompute, which here is a failed check rather than an error.
        let mut cursor = Some(self.tip()?);
        while let Some(expected) = cursor {
            let block = load(&self.store, &expected)?;
            if block.hash != expected {
                warn!(
                    expected = %hex::encode(expected),
                    found = %block.hash_hex(),
                    "block does not match the hash linking to it"
                );
                return Ok(false);
            }
            let required = if block.is_genesis() {
                self.config.genesis_difficulty_bits
            } else {
                self.config.difficulty_bits
            };
            if block.difficulty_bits < required {
                warn!(
                    hash = %block.hash_hex(),
                    bits = block.difficulty_bits,
                    required,
                    "block mined below the configured difficulty"
                );
                return Ok(false);
            }
            if !block.verify(block.difficulty_bits) {
                warn!(hash = %block.hash_hex(), "block fails hash or proof-of-work check");
                return Ok(false);
            }
            cursor = block.prev_hash;
        }
        Ok(true)
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flush and release the store.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

/// Block stored under `hash`; a referenced block that is absent is a storage fault.
fn load<S: ChainStore>(store: &S, hash: &Hash) -> Result<Block> {
    store.get_block(hash)?.ok_or_else(|| {
        ChainError::StorageUnavailable(format!(
            "block {} is referenced but not stored",
            hex::encode(hash)
        ))
    })
}

/// Lazy newest-first traversal. Holds only the next hash to fetch and stops
/// after the genesis block or the first error.
///
/// Every yielded block's hash is recomputed before its link is followed, so a
/// record pointing back into the chain cannot make the walk endless.
pub struct ChainIter<'a, S: ChainStore> {
    store: &'a S,
    cursor: Option<Hash>,
}

impl<S: ChainStore> Iterator for ChainIter<'_, S> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.cursor.take()?;
        let block = match load(self.store, &hash) {
            Ok(block) => block,
            Err(err) => return Some(Err(err)),
        };
        if block.hash != hash || !block.verify_hash() {
            return Some(Err(ChainError::Encoding(format!(
                "record under {} does not hash to its key",
                hex::encode(hash)
            ))));
        }
        self.cursor = block.prev_hash;
        Some(Ok(block))
    }
}

impl<S: ChainStore> FusedIterator for ChainIter<'_, S> {}
