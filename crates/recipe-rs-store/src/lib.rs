//! Persistence for recipe records.
//!
//! Attributes are stored as a single JSON payload column. The codec converts
//! them explicitly before parameters are bound and after rows are scanned;
//! nothing relies on driver-level conversion hooks.

pub mod codec;
pub mod error;
pub mod pool;
pub mod store;

/// Attribute codec.
pub use codec::AttributeCodec;
/// Store and codec error types.
pub use error::{CodecError, StoreError};
/// Connection pool shared by store operations.
pub use pool::ConnectionPool;
/// Record store interface and the SQLite implementation.
pub use store::{Inserted, RecordStore, SqliteRecordStore};
