//! SQLite document store
//!
//! This module provides the SQLite-backed implementation of [`RecordSink`].

use crate::record::Record;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use crate::storage::StoredDocument;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite document store backend
pub struct SqliteStore {
    conn: Connection,
    collection: String,
    document_prefix: String,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `collection` - Logical collection every flush writes to
    /// * `document_prefix` - Prefix of generated document ids
    pub fn new(path: &Path, collection: &str, document_prefix: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            collection: collection.to_string(),
            document_prefix: document_prefix.to_string(),
        })
    }

    /// Creates an in-memory store (for testing)
    pub fn new_in_memory(collection: &str, document_prefix: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            collection: collection.to_string(),
            document_prefix: document_prefix.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Gets one document of the configured collection
    pub fn get_document(&self, doc_id: &str) -> StorageResult<Option<Record>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![self.collection, doc_id],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Lists every document of the configured collection in index order
    pub fn list_documents(&self) -> StorageResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body, written_at FROM documents
             WHERE collection = ?1
             ORDER BY length(doc_id), doc_id",
        )?;

        let rows = stmt.query_map(params![self.collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body, written_at) = row?;
            documents.push(StoredDocument {
                id,
                record: serde_json::from_str(&body)?,
                written_at,
            });
        }

        Ok(documents)
    }

    /// Counts the documents of the configured collection
    pub fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl SqliteStore {
    /// Upserts the whole batch inside one transaction
    fn write_batch(&mut self, records: &[Record]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        for (index, record) in records.iter().enumerate() {
            let doc_id = format!("{}{}", self.document_prefix, index);
            let body = serde_json::to_string(record)?;
            let changed = tx.execute(
                "INSERT INTO documents (collection, doc_id, body, written_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(collection, doc_id)
                 DO UPDATE SET body = excluded.body, written_at = excluded.written_at",
                params![self.collection, doc_id, body, now],
            )?;
            if changed != 1 {
                return Err(StorageError::Database(format!(
                    "upsert of '{}' changed {} rows",
                    doc_id, changed
                )));
            }
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(())
    }
}

impl RecordSink for SqliteStore {
    fn flush(&mut self, records: &[Record]) -> StorageResult<()> {
        tracing::debug!(
            "Attempting to save {} record(s) to '{}': {:?}",
            records.len(),
            self.collection,
            records
        );

        if records.is_empty() {
            tracing::info!("No records to save.");
            return Ok(());
        }

        let sentinels = records.iter().filter(|record| record.is_sentinel()).count();
        if sentinels > 0 {
            tracing::debug!(
                "{} of {} record(s) carry no session details",
                sentinels,
                records.len()
            );
        }

        let result = self.write_batch(records);

        match &result {
            Ok(()) => tracing::info!(
                "Saved {} record(s) to '{}'",
                records.len(),
                self.collection
            ),
            Err(e) => tracing::error!("Failed to save records to '{}': {}", self.collection, e),
        }

        result
    }
}
