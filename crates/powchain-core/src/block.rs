use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::hash::Hash;
use crate::pow::{Preimage, ProofOfWork};

/// A block waiting to be mined: everything except the nonce and its digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub timestamp: u64,
    pub payload: Vec<u8>,
    pub prev_hash: Option<Hash>,
}

impl Candidate {
    pub fn new(prev_hash: Option<Hash>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp: unix_now(),
            payload: payload.into(),
            prev_hash,
        }
    }

    /// Freeze the candidate with the winning nonce found by the miner.
    pub fn seal(self, difficulty_bits: u32, nonce: u64, hash: Hash) -> Block {
        Block {
            timestamp: self.timestamp,
            payload: self.payload,
            prev_hash: self.prev_hash,
            difficulty_bits,
            nonce,
            hash,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: u64,
    pub payload: Vec<u8>,
    /// `None` only for the genesis block.
    pub prev_hash: Option<Hash>,
    pub difficulty_bits: u32,
    pub nonce: u64,
    pub hash: Hash,
}

impl Block {
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_none()
    }

    /// Predecessor hash as committed in the mined data; empty for genesis.
    pub fn prev_hash_bytes(&self) -> &[u8] {
        self.prev_hash.as_ref().map(|h| &h[..]).unwrap_or(&[])
    }

    /// Recompute the digest from the stored fields and nonce.
    pub fn compute_hash(&self) -> Hash {
        Preimage::of_block(self).digest(self.nonce)
    }

    pub fn verify_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Stored hash matches its fields and the nonce meets `difficulty_bits`.
    pub fn verify(&self, difficulty_bits: u32) -> bool {
        self.verify_hash() && ProofOfWork::validate(self, difficulty_bits)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn prev_hash_hex(&self) -> String {
        hex::encode(self.prev_hash_bytes())
    }

    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("timestamp", &self.timestamp)
            .field("payload", &self.payload_lossy())
            .field("prev_hash", &self.prev_hash_hex())
            .field("difficulty_bits", &self.difficulty_bits)
            .field("nonce", &self.nonce)
            .field("hash", &self.hash_hex())
            .finish()
    }
}

pub(crate) fn unix_now() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs(),
        Err(err) => {
            warn!(behind = ?err.duration(), "system clock is before the unix epoch, stamping 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_is_stamped_with_current_time() {
        let before = unix_now();
        let candidate = Candidate::new(None, "now");
        let after = unix_now();
        assert!(candidate.timestamp > 0);
        assert!(before <= candidate.timestamp && candidate.timestamp <= after);
    }
}
