//! JSON file record store
//!
//! The whole collection lives in one pretty-printed JSON array. Every
//! operation re-reads the file and every mutation rewrites it in full.

use crate::store::{
    has_id, matches_filters, Collection, Record, RecordRepository, Result, StorageConfig,
    StorageError, ID_FIELD,
};
use async_trait::async_trait;
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Contents written to a record file that does not exist yet
const EMPTY_COLLECTION: &str = "[]";

/// JSON file backed record store
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    /// Backing file
    path: PathBuf,

    /// Write via temp file + rename
    atomic_writes: bool,
}

impl JsonRecordStore {
    /// Open a store over `path`, creating an empty collection if the file is missing
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(&StorageConfig::new(path)).await
    }

    /// Open a store from a full storage configuration
    pub async fn with_config(config: &StorageConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(StorageError::Configuration(
                "creating a record store requires a file path".to_string(),
            ));
        }

        let store = Self {
            path: config.path.clone(),
            atomic_writes: config.atomic_writes,
        };
        store.ensure_file().await?;
        Ok(store)
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing files are left alone; their contents are only checked on read.
    async fn ensure_file(&self) -> Result<()> {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&self.path, EMPTY_COLLECTION).await?;
                info!(path = %self.path.display(), "Initialized empty record file");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sibling path used for atomic writes, e.g. `users.json.tmp`
    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl RecordRepository for JsonRecordStore {
    async fn get_all(&self) -> Result<Collection> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records: Collection = serde_json::from_slice(&bytes).map_err(StorageError::Parse)?;
        debug!(path = %self.path.display(), count = records.len(), "Read records");
        Ok(records)
    }

    async fn write_all(&self, records: &[Record]) -> Result<()> {
        let content = serde_json::to_string_pretty(records).map_err(StorageError::Serialize)?;

        if self.atomic_writes {
            let temp_path = self.temp_path();
            tokio::fs::write(&temp_path, &content).await?;
            tokio::fs::rename(&temp_path, &self.path).await?;
        } else {
            tokio::fs::write(&self.path, &content).await?;
        }

        debug!(path = %self.path.display(), count = records.len(), "Wrote records");
        Ok(())
    }

    async fn create(&self, mut attrs: Record) -> Result<Record> {
        let id = self.random_id();
        attrs.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut records = self.get_all().await?;
        records.push(attrs.clone());
        self.write_all(&records).await?;

        debug!(id = %id, "Created record");
        Ok(attrs)
    }

    async fn get_one(&self, id: &str) -> Result<Option<Record>> {
        let records = self.get_all().await?;
        Ok(records.into_iter().find(|record| has_id(record, id)))
    }

    async fn get_one_by(&self, filters: &Record) -> Result<Option<Record>> {
        let records = self.get_all().await?;
        Ok(records
            .into_iter()
            .find(|record| matches_filters(record, filters)))
    }

    async fn update(&self, id: &str, attrs: Record) -> Result<Record> {
        let mut records = self.get_all().await?;

        let Some(record) = records.iter_mut().find(|record| has_id(record, id)) else {
            warn!(id = %id, "Update target not found");
            return Err(StorageError::NotFound(id.to_string()));
        };

        for (key, value) in attrs {
            if key == ID_FIELD {
                continue;
            }
            record.insert(key, value);
        }
        let updated = record.clone();

        self.write_all(&records).await?;
        debug!(id = %id, "Updated record");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.get_all().await?;
        let before = records.len();
        records.retain(|record| !has_id(record, id));
        let removed = records.len() < before;

        self.write_all(&records).await?;
        debug!(id = %id, removed, "Deleted record");
        Ok(removed)
    }

    /// 8 hex chars from 4 random bytes of a v4 UUID
    fn random_id(&self) -> String {
        let uuid = uuid::Uuid::new_v4();
        let bytes = uuid.as_bytes();
        format!(
            "{:08x}",
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        )
    }
}
