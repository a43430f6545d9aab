pub const BYTE: usize = 8;
pub const HASH_SIZE: usize = 32;
pub const HASH_BITS: u32 = (HASH_SIZE * BYTE) as u32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const POW_TARGET_DIFFICULTY: u32 = 16;
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
/// Nonces are searched up to the largest signed 64-bit value.
pub const MAX_NONCE: u64 = i64::MAX as u64;
