//! Target-based proof-of-work.
//!
//! A nonce wins when `sha256(prepare_data(nonce))`, read as a big-endian
//! unsigned integer, is strictly below `2^(256 - difficulty_bits)`. The mined
//! data is laid out as:
//!
//! ```text
//! prev_hash (0 or 32 bytes) | payload commitment (32) | timestamp u64 BE
//!     | difficulty_bits u32 BE | nonce u64 BE
//! ```
//!
//! This layout is part of every block hash; changing it invalidates stored chains.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::block::{Block, Candidate};
use crate::constants::{HASH_SIZE, MAX_NONCE};
use crate::error::{ChainError, Result};
use crate::hash::{digest, meets_target, payload_commitment, target_for, Hash};

/// The committed fields of a block, minus the nonce.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Preimage<'a> {
    prev_hash: &'a [u8],
    commitment: Hash,
    timestamp: u64,
    difficulty_bits: u32,
}

impl<'a> Preimage<'a> {
    fn of_candidate(candidate: &'a Candidate, difficulty_bits: u32) -> Self {
        Self {
            prev_hash: candidate.prev_hash.as_ref().map(|h| &h[..]).unwrap_or(&[]),
            commitment: payload_commitment(&[&candidate.payload]),
            timestamp: candidate.timestamp,
            difficulty_bits,
        }
    }

    pub(crate) fn of_block(block: &'a Block) -> Self {
        Self {
            prev_hash: block.prev_hash_bytes(),
            commitment: payload_commitment(&[&block.payload]),
            timestamp: block.timestamp,
            difficulty_bits: block.difficulty_bits,
        }
    }

    fn bytes(&self, nonce: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.prev_hash.len() + HASH_SIZE + 8 + 4 + 8);
        bytes.extend_from_slice(self.prev_hash);
        bytes.extend_from_slice(&self.commitment);
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&self.difficulty_bits.to_be_bytes());
        bytes.extend_from_slice(&nonce.to_be_bytes());
        bytes
    }

    pub(crate) fn digest(&self, nonce: u64) -> Hash {
        digest(&self.bytes(nonce))
    }
}

/// One mining or verification attempt against a fixed target.
#[derive(Debug)]
pub struct ProofOfWork<'a> {
    preimage: Preimage<'a>,
    target: Hash,
    max_nonce: u64,
}

impl<'a> ProofOfWork<'a> {
    /// Puzzle for an unmined candidate; the difficulty is committed in the data.
    pub fn new(candidate: &'a Candidate, difficulty_bits: u32) -> Result<Self> {
        Ok(Self {
            target: target_for(difficulty_bits)?,
            preimage: Preimage::of_candidate(candidate, difficulty_bits),
            max_nonce: MAX_NONCE,
        })
    }

    /// Puzzle rebuilt from a mined block. The data uses the block's recorded
    /// difficulty; the target comes from `difficulty_bits`.
    pub fn for_block(block: &'a Block, difficulty_bits: u32) -> Result<Self> {
        Ok(Self {
            target: target_for(difficulty_bits)?,
            preimage: Preimage::of_block(block),
            max_nonce: MAX_NONCE,
        })
    }

    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    pub fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        self.preimage.bytes(nonce)
    }

    pub fn check(&self, nonce: u64) -> Option<Hash> {
        let hash = self.preimage.digest(nonce);
        meets_target(&hash, &self.target).then_some(hash)
    }

    /// Scan nonces from 0 upward until one meets the target.
    pub fn run(&self) -> Result<(Hash, u64)> {
        for nonce in 0..=self.max_nonce {
            if let Some(hash) = self.check(nonce) {
                info!(nonce, hash = %hex::encode(hash), "mined block");
                return Ok((hash, nonce));
            }
        }
        Err(ChainError::MiningExhausted {
            max_nonce: self.max_nonce,
        })
    }

    /// Same search spread over the rayon pool. Any winning nonce may be
    /// returned, not necessarily the smallest.
    pub fn run_parallel(&self) -> Result<(Hash, u64)> {
        let found = (0..=self.max_nonce)
            .into_par_iter()
            .find_map_any(|nonce| self.check(nonce).map(|hash| (hash, nonce)));
        match found {
            Some((hash, nonce)) => {
                info!(nonce, hash = %hex::encode(hash), "mined block in parallel");
                Ok((hash, nonce))
            }
            None => Err(ChainError::MiningExhausted {
                max_nonce: self.max_nonce,
            }),
        }
    }

    /// One hash evaluation: does `nonce` meet the target?
    pub fn is_valid(&self, nonce: u64) -> bool {
        self.check(nonce).is_some()
    }

    /// Verify a mined block without re-mining it.
    pub fn validate(block: &Block, difficulty_bits: u32) -> bool {
        match ProofOfWork::for_block(block, difficulty_bits) {
            Ok(pow) => pow.is_valid(block.nonce),
            Err(err) => {
                debug!(%err, "rejecting block with unusable difficulty");
                false
            }
        }
    }
}

/// Mine `candidate` at `difficulty_bits`, optionally across the rayon pool.
pub fn mine(
    candidate: Candidate,
    difficulty_bits: u32,
    max_nonce: u64,
    parallel: bool,
) -> Result<Block> {
    let (hash, nonce) = {
        let pow = ProofOfWork::new(&candidate, difficulty_bits)?.with_max_nonce(max_nonce);
        if parallel {
            pow.run_parallel()?
        } else {
            pow.run()?
        }
    };
    Ok(candidate.seal(difficulty_bits, nonce, hash))
}
