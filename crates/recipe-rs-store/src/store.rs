//! Record store interface and its SQLite implementation.

use crate::codec::AttributeCodec;
use crate::error::StoreError;
use crate::pool::ConnectionPool;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use recipe_rs_config::DatabaseConfig;
use recipe_rs_protocol::{RecipeAttributes, Record, RecordId};
use rusqlite::{Connection, Row, params};
use std::sync::Arc;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    attributes BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";
const SELECT_ALL: &str = "SELECT id, attributes, created_at, updated_at FROM recipes";
const SELECT_BY_ID: &str =
    "SELECT id, attributes, created_at, updated_at FROM recipes WHERE id = ?1";
const INSERT: &str = "INSERT INTO recipes (attributes, created_at, updated_at) VALUES (?1, ?2, ?2)";
// Timestamps are fixed-width RFC3339 strings, so MAX keeps updated_at monotonic.
const UPDATE: &str =
    "UPDATE recipes SET attributes = ?1, updated_at = MAX(updated_at, ?2) WHERE id = ?3";
const DELETE: &str = "DELETE FROM recipes WHERE id = ?1";

/// Outcome of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// Identifier assigned by the database.
    pub id: RecordId,
    /// Rows written by the statement (expected 1).
    pub rows_affected: u64,
}

#[async_trait]
/// Persistence interface used by the HTTP boundary.
///
/// Write operations report affected-row counts; a count of zero for update
/// or delete means the id did not exist and is not an error.
pub trait RecordStore: Send + Sync {
    /// All records, in no particular order.
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;

    /// A single record, or `None` when the id does not exist.
    async fn get_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Insert a record; id and timestamps are assigned by the store.
    async fn create(&self, attributes: &RecipeAttributes) -> Result<Inserted, StoreError>;

    /// Replace the attributes of a record, returning the affected-row count.
    async fn update(
        &self,
        id: RecordId,
        attributes: &RecipeAttributes,
    ) -> Result<u64, StoreError>;

    /// Remove a record, returning the affected-row count.
    async fn delete(&self, id: RecordId) -> Result<u64, StoreError>;
}

/// SQLite-backed record store.
///
/// Statements run on the tokio blocking pool against connections borrowed
/// from a shared [`ConnectionPool`].
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteRecordStore {
    /// Open the configured database, creating the table when enabled.
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let store = Self::from_pool(ConnectionPool::open(config)?);
        if config.create_schema {
            store.ensure_schema()?;
        }
        Ok(store)
    }

    /// In-memory store with the table created.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(&DatabaseConfig::default())
    }

    /// Wrap an existing pool without touching the schema.
    pub fn from_pool(pool: ConnectionPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// The pool backing this store.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Create the `recipes` table if it does not exist.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get();
        conn.execute(CREATE_TABLE, []).map_err(StoreError::Write)?;
        info!("recipes table ready (location={})", self.pool.location());
        Ok(())
    }

    /// Visit every record without collecting them, returning the count.
    ///
    /// Rows are decoded one at a time as the cursor advances. This blocks the
    /// calling thread and holds one pooled connection until it returns.
    pub fn scan<F>(&self, visit: F) -> Result<usize, StoreError>
    where
        F: FnMut(Record) -> Result<(), StoreError>,
    {
        let conn = self.pool.get();
        scan_records(&conn, visit)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let store = self.clone();
        let records = tokio::task::spawn_blocking(move || {
            let mut records = Vec::new();
            store.scan(|record| {
                records.push(record);
                Ok(())
            })?;
            Ok::<_, StoreError>(records)
        })
        .await??;
        debug!("listed records (count={})", records.len());
        Ok(records)
    }

    async fn get_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let pool = self.pool.clone();
        let record =
            tokio::task::spawn_blocking(move || select_by_id(&pool.get(), id)).await??;
        debug!("fetched record (id={}, found={})", id, record.is_some());
        Ok(record)
    }

    async fn create(&self, attributes: &RecipeAttributes) -> Result<Inserted, StoreError> {
        let payload = AttributeCodec::encode(attributes)?;
        let pool = self.pool.clone();
        let inserted = tokio::task::spawn_blocking(move || {
            let conn = pool.get();
            let mut stmt = conn.prepare_cached(INSERT).map_err(StoreError::Write)?;
            let rows = stmt
                .execute(params![payload, timestamp(Utc::now())])
                .map_err(StoreError::Write)?;
            Ok::<_, StoreError>(Inserted {
                id: conn.last_insert_rowid(),
                rows_affected: rows as u64,
            })
        })
        .await??;
        debug!(
            "inserted record (id={}, rows_affected={})",
            inserted.id, inserted.rows_affected
        );
        Ok(inserted)
    }

    async fn update(
        &self,
        id: RecordId,
        attributes: &RecipeAttributes,
    ) -> Result<u64, StoreError> {
        let payload = AttributeCodec::encode(attributes)?;
        let pool = self.pool.clone();
        let rows = tokio::task::spawn_blocking(move || {
            let conn = pool.get();
            let mut stmt = conn.prepare_cached(UPDATE).map_err(StoreError::Write)?;
            let rows = stmt
                .execute(params![payload, timestamp(Utc::now()), id])
                .map_err(StoreError::Write)?;
            Ok::<_, StoreError>(rows as u64)
        })
        .await??;
        debug!("updated record (id={id}, rows_affected={rows})");
        Ok(rows)
    }

    async fn delete(&self, id: RecordId) -> Result<u64, StoreError> {
        let pool = self.pool.clone();
        let rows = tokio::task::spawn_blocking(move || {
            let conn = pool.get();
            let mut stmt = conn.prepare_cached(DELETE).map_err(StoreError::Write)?;
            let rows = stmt.execute(params![id]).map_err(StoreError::Write)?;
            Ok::<_, StoreError>(rows as u64)
        })
        .await??;
        debug!("deleted record (id={id}, rows_affected={rows})");
        Ok(rows)
    }
}

fn scan_records<F>(conn: &Connection, mut visit: F) -> Result<usize, StoreError>
where
    F: FnMut(Record) -> Result<(), StoreError>,
{
    let mut stmt = conn.prepare_cached(SELECT_ALL).map_err(StoreError::Query)?;
    let mut rows = stmt.query([]).map_err(StoreError::Query)?;
    let mut count = 0;
    while let Some(row) = rows.next().map_err(StoreError::Query)? {
        visit(record_from_row(row)?)?;
        count += 1;
    }
    Ok(count)
}

fn select_by_id(conn: &Connection, id: RecordId) -> Result<Option<Record>, StoreError> {
    let mut stmt = conn.prepare_cached(SELECT_BY_ID).map_err(StoreError::Query)?;
    let mut rows = stmt.query(params![id]).map_err(StoreError::Query)?;
    match rows.next().map_err(StoreError::Query)? {
        Some(row) => Ok(Some(record_from_row(row)?)),
        None => Ok(None),
    }
}

/// Map a `(id, attributes, created_at, updated_at)` row into a record.
fn record_from_row(row: &Row<'_>) -> Result<Record, StoreError> {
    let id: RecordId = row.get(0).map_err(StoreError::Query)?;
    let attributes = AttributeCodec::decode_column(row.get_ref(1).map_err(StoreError::Query)?)?;
    let created_at = parse_timestamp(row, 2, "created_at")?;
    let updated_at = parse_timestamp(row, 3, "updated_at")?;
    Ok(Record {
        id,
        attributes,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(
    row: &Row<'_>,
    index: usize,
    column: &'static str,
) -> Result<DateTime<Utc>, StoreError> {
    let raw: String = row.get(index).map_err(StoreError::Query)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp { column, value: raw })
}

/// Fixed-width RFC3339 representation used for timestamp columns.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
