//! Error types for the attribute codec and record store.

use rusqlite::types::Type;
use thiserror::Error;

/// Errors converting attributes to or from their stored payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serializing attributes failed.
    #[error("failed to encode attributes: {0}")]
    Encode(#[source] serde_json::Error),
    /// The stored payload is not a well-formed attributes document.
    #[error("malformed attributes payload: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The column held a value that is not a byte sequence.
    #[error("attributes column holds {found}, expected blob or text")]
    UnexpectedType { found: Type },
}

/// Errors returned by record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening or configuring a connection failed.
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),
    /// A read statement failed.
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),
    /// A write statement failed.
    #[error("write failed: {0}")]
    Write(#[source] rusqlite::Error),
    /// A timestamp column could not be parsed.
    #[error("invalid {column} timestamp: {value}")]
    Timestamp { column: &'static str, value: String },
    /// Attribute encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The blocking database task panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
