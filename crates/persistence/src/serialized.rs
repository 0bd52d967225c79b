//! Serialized repository access
//!
//! Wraps any repository so that calls from one process run one at a time.
//! Reads wait behind writes too, so a caller never sees a half-finished
//! read-modify-write from a sibling task. Writers in other processes are
//! not covered.

use crate::store::{Collection, Record, RecordRepository, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

/// Repository wrapper holding an async mutex across every call
#[derive(Debug)]
pub struct SerializedRepository<R> {
    inner: R,
    gate: Mutex<()>,
}

impl<R: RecordRepository> SerializedRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: RecordRepository> RecordRepository for SerializedRepository<R> {
    async fn get_all(&self) -> Result<Collection> {
        let _guard = self.gate.lock().await;
        self.inner.get_all().await
    }

    async fn write_all(&self, records: &[Record]) -> Result<()> {
        let _guard = self.gate.lock().await;
        self.inner.write_all(records).await
    }

    async fn create(&self, attrs: Record) -> Result<Record> {
        let _guard = self.gate.lock().await;
        trace!("create holding repository gate");
        self.inner.create(attrs).await
    }

    async fn get_one(&self, id: &str) -> Result<Option<Record>> {
        let _guard = self.gate.lock().await;
        self.inner.get_one(id).await
    }

    async fn get_one_by(&self, filters: &Record) -> Result<Option<Record>> {
        let _guard = self.gate.lock().await;
        self.inner.get_one_by(filters).await
    }

    async fn update(&self, id: &str, attrs: Record) -> Result<Record> {
        let _guard = self.gate.lock().await;
        trace!(id = %id, "update holding repository gate");
        self.inner.update(id, attrs).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.gate.lock().await;
        trace!(id = %id, "delete holding repository gate");
        self.inner.delete(id).await
    }

    fn random_id(&self) -> String {
        self.inner.random_id()
    }
}
