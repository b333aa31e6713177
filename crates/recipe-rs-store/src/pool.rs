//! Fixed-size SQLite connection pool.

use crate::error::StoreError;
use log::{debug, info};
use parking_lot::{Mutex, MutexGuard};
use recipe_rs_config::DatabaseConfig;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Pool of SQLite connections handed out round-robin.
///
/// In-memory databases always get a single connection: every in-memory
/// connection would otherwise see its own empty database.
pub struct ConnectionPool {
    slots: Vec<Mutex<Connection>>,
    next: AtomicUsize,
    location: String,
}

impl ConnectionPool {
    /// Open the pool described by the database config.
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let size = config.effective_pool_size();
        let mut slots = Vec::with_capacity(size);
        let location = if config.is_in_memory() {
            slots.push(Mutex::new(open_in_memory(busy_timeout)?));
            ":memory:".to_string()
        } else {
            let path = config.path.clone().unwrap_or_default();
            for _ in 0..size {
                slots.push(Mutex::new(open_file(&path, busy_timeout)?));
            }
            path
        };
        info!(
            "opened connection pool (location={}, size={})",
            location,
            slots.len()
        );
        Ok(Self {
            slots,
            next: AtomicUsize::new(0),
            location,
        })
    }

    /// Single-connection in-memory pool.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(&DatabaseConfig::default())
    }

    /// Number of connections held by the pool.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Database path, or `:memory:`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Borrow a connection, blocking until one is available.
    ///
    /// An idle connection is preferred; when all are busy the caller waits on
    /// its round-robin slot.
    pub fn get(&self) -> MutexGuard<'_, Connection> {
        let len = self.slots.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            if let Some(guard) = self.slots[(start + offset) % len].try_lock() {
                return guard;
            }
        }
        debug!("all pooled connections busy, waiting (slot={start})");
        self.slots[start].lock()
    }
}

fn open_in_memory(busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
    configure(&conn, busy_timeout)?;
    Ok(conn)
}

fn open_file(path: &str, busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open(path).map_err(StoreError::Open)?;
    configure(&conn, busy_timeout)?;
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(StoreError::Open)?;
    debug!("configured file connection (path={path}, journal_mode={mode})");
    Ok(conn)
}

fn configure(conn: &Connection, busy_timeout: Duration) -> Result<(), StoreError> {
    conn.busy_timeout(busy_timeout).map_err(StoreError::Open)?;
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(StoreError::Open)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ConnectionPool;
    use pretty_assertions::assert_eq;
    use recipe_rs_config::DatabaseConfig;
    use tempfile::tempdir;

    #[test]
    fn in_memory_pool_has_one_connection() {
        let config = DatabaseConfig {
            pool_size: 8,
            ..DatabaseConfig::default()
        };
        let pool = ConnectionPool::open(&config).expect("pool");
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.location(), ":memory:");
    }

    #[test]
    fn file_pool_opens_configured_size() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pool.db");
        let config = DatabaseConfig {
            path: Some(path.to_string_lossy().to_string()),
            pool_size: 3,
            ..DatabaseConfig::default()
        };
        let pool = ConnectionPool::open(&config).expect("pool");
        assert_eq!(pool.size(), 3);
    }

    #[test]
    fn busy_connections_fall_through_to_idle_ones() {
        let dir = tempdir().expect("tempdir");
        let config = DatabaseConfig {
            path: Some(dir.path().join("busy.db").to_string_lossy().to_string()),
            pool_size: 2,
            ..DatabaseConfig::default()
        };
        let pool = ConnectionPool::open(&config).expect("pool");
        let first = pool.get();
        let second = pool.get();
        let value: i64 = second
            .query_row("SELECT 1", [], |row| row.get(0))
            .expect("query");
        assert_eq!(value, 1);
        drop(first);
    }
}
