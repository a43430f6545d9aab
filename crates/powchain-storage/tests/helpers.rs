#![allow(dead_code)]

use std::path::PathBuf;

use powchain_core::{Chain, ChainConfig};
use powchain_storage::SledStore;
use tempfile::{tempdir, TempDir};

pub fn create_temp_dir() -> (TempDir, PathBuf) {
    // Create a temporary directory for the sled database
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("chain.db");
    (temp_dir, db_path)
}

pub fn create_temp_store() -> (TempDir, PathBuf, SledStore) {
    let (temp_dir, db_path) = create_temp_dir();
    let store = SledStore::open(&db_path).expect("Failed to open SledStore");
    (temp_dir, db_path, store)
}

pub fn quick_config() -> ChainConfig {
    ChainConfig::with_difficulty(8)
}

pub fn open_chain(db_path: &PathBuf, config: ChainConfig) -> Chain<SledStore> {
    let store = SledStore::open(db_path).expect("Failed to open SledStore");
    Chain::open(store, config).expect("Failed to open chain")
}

pub fn teardown(temp_dir: TempDir) {
    let dir = temp_dir.path().to_path_buf();
    temp_dir.close().expect("Failed to delete temp dir");
    assert!(!dir.exists(), "Database directory should be removed");
}
