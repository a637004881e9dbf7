//! Storage module for persisting extracted records
//!
//! This module handles the document store the crawl flushes into:
//! - SQLite database initialization and schema management
//! - Atomic, position-keyed batch writes
//! - Read access for inspection and tests

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{RecordSink, StorageError, StorageResult};

use crate::config::StoreConfig;
use crate::record::Record;
use crate::ScrapeError;

use std::path::Path;

/// Opens the document store described by the configuration
pub fn open_store(config: &StoreConfig) -> Result<SqliteStore, ScrapeError> {
    let store = SqliteStore::new(
        Path::new(&config.database_path),
        &config.collection,
        &config.document_prefix,
    )?;
    Ok(store)
}

/// A document as read back from the store
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub record: Record,
    pub written_at: String,
}
