//! Storage traits and error types
//!
//! This module defines the sink interface the crawler writes through and
//! associated error types.

use crate::record::Record;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the records extracted from one detail page
///
/// A sink is built once and handed to the crawl by mutable reference.
pub trait RecordSink {
    /// Writes one batch atomically
    ///
    /// Each record is keyed by its zero-based position inside `records`, so a
    /// later batch overwrites the documents an earlier batch wrote at the same
    /// positions. An empty batch writes nothing and succeeds.
    fn flush(&mut self, records: &[Record]) -> StorageResult<()>;
}
