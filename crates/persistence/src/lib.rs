//! Recstore Persistence - file-backed record store
//!
//! A collection of open-field records kept as one JSON array on disk.
//!
//! - `store`: record types, errors, the `RecordRepository` trait
//! - `json`: the JSON file implementation
//! - `serialized`: opt-in wrapper that runs calls one at a time
//!
//! The plain JSON store has no locking: concurrent mutations race and the
//! last writer wins.

pub mod json;
pub mod serialized;
pub mod store;

use std::sync::Arc;

pub use json::JsonRecordStore;
pub use serialized::SerializedRepository;
pub use store::{
    Collection, Record, RecordRepository, Result, SharedRepository, StorageConfig, StorageError,
    ID_FIELD,
};

/// Build the repository described by `config`
pub async fn open_repository(config: &StorageConfig) -> Result<SharedRepository> {
    let store = JsonRecordStore::with_config(config).await?;
    if config.serialize_writes {
        Ok(Arc::new(SerializedRepository::new(store)))
    } else {
        Ok(Arc::new(store))
    }
}
