use powchain_core::constants::HASH_SIZE;
use powchain_core::{codec, Block, ChainError, ChainStore, Hash, Result};
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use tracing::{debug, info, warn};

const TREE_BLOCKS: &str = "blocks";
const TREE_META: &str = "meta";
/// Reserved key holding the tip hash.
pub const KEY_TIP: &[u8] = b"l";

/// Chain store on a sled database: serialized blocks keyed by hash in the
/// `blocks` tree, the tip hash under `"l"` in the `meta` tree.
#[derive(Clone, Debug)]
pub struct SledStore {
    db: Db,
    blocks: Tree,
    meta: Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(ChainError::storage)?;
        let blocks = db.open_tree(TREE_BLOCKS).map_err(ChainError::storage)?;
        let meta = db.open_tree(TREE_META).map_err(ChainError::storage)?;
        info!(path = %path.display(), "sled store opened");
        Ok(Self { db, blocks, meta })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush().map_err(ChainError::storage)?;
        Ok(())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl ChainStore for SledStore {
    fn get_block(&self, hash: &Hash) -> Result<Option<Block>> {
        let Some(bytes) = self.blocks.get(hash).map_err(ChainError::storage)? else {
            return Ok(None);
        };
        let block = codec::decode(&bytes)?;
        if block.hash != *hash {
            return Err(ChainError::Encoding(format!(
                "record under {} holds block {}",
                hex::encode(hash),
                block.hash_hex()
            )));
        }
        Ok(Some(block))
    }

    fn tip(&self) -> Result<Option<Hash>> {
        let Some(value) = self.meta.get(KEY_TIP).map_err(ChainError::storage)? else {
            return Ok(None);
        };
        let tip = <Hash>::try_from(&value[..]).map_err(|_| {
            ChainError::StorageUnavailable(format!(
                "tip record is {} bytes, expected {HASH_SIZE}",
                value.len()
            ))
        })?;
        Ok(Some(tip))
    }

    /// Commits block and tip in one transaction, then flushes. A flush error
    /// is returned even though the commit already made `block` the tip.
    fn append(&self, block: &Block) -> Result<()> {
        let bytes = codec::encode(block)?;
        (&self.blocks, &self.meta)
            .transaction(|(blocks, meta)| -> ConflictableTransactionResult<(), ()> {
                blocks.insert(&block.hash[..], bytes.as_slice())?;
                meta.insert(KEY_TIP, &block.hash[..])?;
                Ok(())
            })
            .map_err(|err| match err {
                TransactionError::Abort(()) => ChainError::storage("append transaction aborted"),
                TransactionError::Storage(err) => ChainError::storage(err),
            })?;
        debug!(hash = %block.hash_hex(), bytes = bytes.len(), "committed block and advanced tip");
        if let Err(err) = self.flush() {
            warn!(hash = %block.hash_hex(), %err, "block committed as tip but flush failed");
            return Err(err);
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.flush()?;
        info!("sled store closed");
        Ok(())
    }
}
