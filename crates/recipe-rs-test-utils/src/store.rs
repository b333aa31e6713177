use async_trait::async_trait;
use parking_lot::Mutex;
use recipe_rs_protocol::{RecipeAttributes, Record, RecordId};
use recipe_rs_store::{Inserted, RecordStore, SqliteRecordStore, StoreError};
use rusqlite::ffi;
use std::sync::Arc;

/// Fresh in-memory SQLite store with the schema created.
pub fn in_memory_store() -> Arc<SqliteRecordStore> {
    Arc::new(SqliteRecordStore::in_memory().expect("in-memory store"))
}

/// Attributes used by most tests.
pub fn sample_attributes() -> RecipeAttributes {
    RecipeAttributes::new(
        "Pancakes",
        vec!["flour".to_string(), "egg".to_string(), "milk".to_string()],
    )
}

/// Store whose every operation fails as if the database were unavailable.
#[derive(Clone, Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn new() -> Self {
        Self
    }
}

fn io_error() -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_IOERR),
        Some("disk I/O error".to_string()),
    )
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Query(io_error()))
    }

    async fn get_by_id(&self, _id: RecordId) -> Result<Option<Record>, StoreError> {
        Err(StoreError::Query(io_error()))
    }

    async fn create(&self, _attributes: &RecipeAttributes) -> Result<Inserted, StoreError> {
        Err(StoreError::Write(io_error()))
    }

    async fn update(
        &self,
        _id: RecordId,
        _attributes: &RecipeAttributes,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Write(io_error()))
    }

    async fn delete(&self, _id: RecordId) -> Result<u64, StoreError> {
        Err(StoreError::Write(io_error()))
    }
}

/// Operation observed by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListAll,
    GetById(RecordId),
    Create(RecipeAttributes),
    Update(RecordId, RecipeAttributes),
    Delete(RecordId),
}

/// Store wrapper that records every call before delegating.
#[derive(Clone)]
pub struct RecordingStore {
    inner: Arc<dyn RecordStore>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl RecordingStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls observed so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.record(StoreCall::ListAll);
        self.inner.list_all().await
    }

    async fn get_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        self.record(StoreCall::GetById(id));
        self.inner.get_by_id(id).await
    }

    async fn create(&self, attributes: &RecipeAttributes) -> Result<Inserted, StoreError> {
        self.record(StoreCall::Create(attributes.clone()));
        self.inner.create(attributes).await
    }

    async fn update(
        &self,
        id: RecordId,
        attributes: &RecipeAttributes,
    ) -> Result<u64, StoreError> {
        self.record(StoreCall::Update(id, attributes.clone()));
        self.inner.update(id, attributes).await
    }

    async fn delete(&self, id: RecordId) -> Result<u64, StoreError> {
        self.record(StoreCall::Delete(id));
        self.inner.delete(id).await
    }
}
