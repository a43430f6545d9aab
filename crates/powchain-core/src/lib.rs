//! Proof-of-work block chain: hashing, mining, the hash-linked chain and the
//! storage trait its backends implement.

pub mod block;
pub mod chain;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod hash;
pub mod pow;
pub mod store;

pub use block::{Block, Candidate};
pub use chain::{Chain, ChainIter};
pub use config::ChainConfig;
pub use error::{ChainError, Result};
pub use hash::{digest, payload_commitment, Hash};
pub use pow::ProofOfWork;
pub use store::{ChainStore, MemoryStore};
