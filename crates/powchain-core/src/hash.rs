//! SHA-256 helpers shared by mining, validation and the stores.

use sha2::{Digest, Sha256};

use crate::constants::{BYTE, HASH_BITS, HASH_SIZE};
use crate::error::{ChainError, Result};

pub type Hash = [u8; HASH_SIZE];

pub fn digest(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Fixed-size commitment to an ordered list of items: the digest of the
/// concatenated per-item digests, so the hashed input never grows with the
/// item sizes.
pub fn payload_commitment<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(digest(item.as_ref()));
    }
    hasher.finalize().into()
}

/// Target for `difficulty_bits`, i.e. 2^(256 - bits) as a big-endian integer.
pub fn target_for(difficulty_bits: u32) -> Result<Hash> {
    if difficulty_bits == 0 || difficulty_bits > HASH_BITS {
        return Err(ChainError::InvalidDifficulty(difficulty_bits));
    }
    let bit = (HASH_BITS - difficulty_bits) as usize;
    let mut target = [0u8; HASH_SIZE];
    target[HASH_SIZE - 1 - bit / BYTE] = 1 << (bit % BYTE);
    Ok(target)
}

/// Byte arrays order lexicographically, which is big-endian numeric order.
pub fn meets_target(hash: &Hash, target: &Hash) -> bool {
    hash < target
}

pub fn leading_zero_bits(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 8;
        } else {
            total += b.leading_zeros();
            break;
        }
    }
    total
}
