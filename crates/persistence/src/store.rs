//! Storage contracts
//!
//! Record and collection types, the error type shared by every backend,
//! and the repository trait the interface layer programs against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Reserved field holding the store-assigned identifier
pub const ID_FIELD: &str = "id";

/// One persisted entity: an open set of fields plus the reserved `id`
pub type Record = Map<String, Value>;

/// Every record in the backing file, in insertion order
pub type Collection = Vec<Record>;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to parse record file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("record with id {0} not found")]
    NotFound(String),

    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Read-modify-write access to a single collection of records.
///
/// Implementations re-read the backing file on every call. Mutations are
/// last-writer-wins unless the implementation says otherwise.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Read and parse the whole collection
    async fn get_all(&self) -> Result<Collection>;

    /// Overwrite the whole collection
    async fn write_all(&self, records: &[Record]) -> Result<()>;

    /// Assign a fresh id to `attrs`, append it, and return the stored record
    async fn create(&self, attrs: Record) -> Result<Record>;

    /// First record whose id equals `id`
    async fn get_one(&self, id: &str) -> Result<Option<Record>>;

    /// First record carrying every key of `filters` with an equal value
    async fn get_one_by(&self, filters: &Record) -> Result<Option<Record>>;

    /// Shallow-merge `attrs` into the record with `id` and return the result.
    ///
    /// Keys in `attrs` overwrite same-named fields, except `id`: an `id` key
    /// in `attrs` is dropped so the record keeps its identifier. Fails with
    /// `NotFound` if no record has `id`.
    async fn update(&self, id: &str, attrs: Record) -> Result<Record>;

    /// Drop every record with `id`; rewrites the file even when nothing matched
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Short printable token used as a record id
    fn random_id(&self) -> String;
}

/// Shared repository reference
pub type SharedRepository = Arc<dyn RecordRepository>;

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON record file
    pub path: PathBuf,

    /// Write through a temporary file and rename it into place
    pub atomic_writes: bool,

    /// Run repository calls one at a time behind an async mutex
    pub serialize_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("users.json"),
            atomic_writes: false,
            serialize_writes: false,
        }
    }
}

impl StorageConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Whether `record` carries `id` as its identifier
pub(crate) fn has_id(record: &Record, id: &str) -> bool {
    matches!(record.get(ID_FIELD), Some(Value::String(s)) if s == id)
}

/// Whether every filter key is present on `record` with an equal value
pub(crate) fn matches_filters(record: &Record, filters: &Record) -> bool {
    filters
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}
