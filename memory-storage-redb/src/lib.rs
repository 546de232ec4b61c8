#![allow(clippy::excessive_nesting)]

//! # Memory Storage - redb
//!
//! A durable [`StorageBackend`] implementation backed by
//! [`redb`](https://docs.rs/redb), an embedded single-file key-value
//! store. Entries are postcard-encoded and keyed by id; a secondary
//! index maps `session_id -> [id]` so session-scoped listing doesn't
//! require a full-table scan, and a fingerprint index maps
//! `session_id:content_hash -> id` for duplicate detection.
//!
//! Every redb operation is synchronous; this crate runs each one
//! inside `spawn_blocking` with a timeout so the async coordinator
//! never blocks its executor on disk I/O.

use async_trait::async_trait;
use memory_core::memory::{BackendStats, MemoryEntry, MemoryQuery, StorageBackend};
use memory_core::{Error, Result};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Primary table: entry id (as a string) -> postcard-encoded [`MemoryEntry`].
const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");
/// Secondary index: `"{session_id}\u{0}{id}"` -> id bytes, enabling a
/// session-scoped range scan by key prefix.
const SESSION_INDEX_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("session_index");
/// Fingerprint index: `"{session_id}\u{0}{content_hash}"` -> id, for
/// [`StorageBackend::find_by_fingerprint`].
const FINGERPRINT_INDEX_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("fingerprint_index");

/// Maximum size for one entry's postcard payload (1MB). Guards against
/// a corrupted or maliciously oversized record wedging deserialization.
pub const MAX_ENTRY_SIZE: usize = 1_000_000;

const DB_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

async fn with_db_timeout<T, F>(operation: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(DB_OPERATION_TIMEOUT, tokio::task::spawn_blocking(operation)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(Error::Storage(format!("redb task join error: {join_err}"))),
        Err(_) => Err(Error::Storage(format!("redb operation timed out after {DB_OPERATION_TIMEOUT:?}"))),
    }
}

fn session_index_key(session_id: &str, id: Uuid) -> String {
    format!("{session_id}\u{0}{id}")
}

fn fingerprint_index_key(session_id: &str, content_hash: &str) -> String {
    format!("{session_id}\u{0}{content_hash}")
}

/// redb-backed durable [`StorageBackend`].
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Opens (creating if absent) a redb database at `path` and
    /// ensures all three tables exist.
    pub async fn new(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening redb memory backend");
        let path_buf = path.to_path_buf();
        let db = with_db_timeout(move || {
            Database::create(&path_buf).map_err(|e| Error::Storage(format!("failed to open redb database: {e}")))
        })
        .await?;

        let backend = Self { db: Arc::new(db) };
        backend.initialize_tables().await?;
        Ok(backend)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let write_txn = db.begin_write().map_err(|e| Error::Storage(format!("failed to begin write txn: {e}")))?;
            {
                write_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(format!("failed to open entries table: {e}")))?;
                write_txn
                    .open_table(SESSION_INDEX_TABLE)
                    .map_err(|e| Error::Storage(format!("failed to open session index table: {e}")))?;
                write_txn
                    .open_table(FINGERPRINT_INDEX_TABLE)
                    .map_err(|e| Error::Storage(format!("failed to open fingerprint index table: {e}")))?;
            }
            write_txn.commit().map_err(|e| Error::Storage(format!("failed to commit init txn: {e}")))?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    async fn put(&self, entry: MemoryEntry) -> Result<()> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let bytes = postcard::to_allocvec(&entry).map_err(|e| Error::Storage(format!("serialization error: {e}")))?;
            let id_key = entry.id.to_string();
            let session_key = session_index_key(&entry.session_id, entry.id);
            let fingerprint_key = entry
                .metadata
                .get("content_hash")
                .map(|hash| fingerprint_index_key(&entry.session_id, hash));

            let write_txn = db.begin_write().map_err(|e| Error::Storage(format!("failed to begin write txn: {e}")))?;
            {
                let mut entries = write_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                entries.insert(id_key.as_str(), bytes.as_slice()).map_err(|e| Error::Storage(e.to_string()))?;

                let mut session_index = write_txn.open_table(SESSION_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                session_index.insert(session_key.as_str(), id_key.as_bytes()).map_err(|e| Error::Storage(e.to_string()))?;

                if let Some(fingerprint_key) = &fingerprint_key {
                    let mut fingerprint_index =
                        write_txn.open_table(FINGERPRINT_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                    fingerprint_index
                        .insert(fingerprint_key.as_str(), id_key.as_bytes())
                        .map_err(|e| Error::Storage(e.to_string()))?;
                }
            }
            write_txn.commit().map_err(|e| Error::Storage(format!("failed to commit put txn: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db.begin_read().map_err(|e| Error::Storage(format!("failed to begin read txn: {e}")))?;
            let entries = read_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
            let id_key = id.to_string();
            match entries.get(id_key.as_str()).map_err(|e| Error::Storage(e.to_string()))? {
                Some(bytes) => {
                    if bytes.value().len() > MAX_ENTRY_SIZE {
                        return Err(Error::Storage("stored entry exceeds maximum allowed size".to_string()));
                    }
                    let entry: MemoryEntry = postcard::from_bytes(bytes.value()).map_err(|e| Error::Storage(format!("serialization error: {e}")))?;
                    Ok(Some(entry))
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn list(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        let db = Arc::clone(&self.db);
        let session_id = query.session_id.clone();
        let memory_type = query.memory_type;
        let limit = query.limit.max(1);
        with_db_timeout(move || {
            let read_txn = db.begin_read().map_err(|e| Error::Storage(format!("failed to begin read txn: {e}")))?;
            let session_index = read_txn.open_table(SESSION_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
            let entries = read_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;

            let prefix = format!("{session_id}\u{0}");
            let mut matches = Vec::new();
            for item in session_index.range(prefix.as_str()..).map_err(|e| Error::Storage(e.to_string()))? {
                let (key, value) = item.map_err(|e| Error::Storage(e.to_string()))?;
                if !key.value().starts_with(&prefix) {
                    break;
                }
                let id_key = String::from_utf8_lossy(value.value()).into_owned();
                let Some(bytes) = entries.get(id_key.as_str()).map_err(|e| Error::Storage(e.to_string()))? else {
                    continue;
                };
                let entry: MemoryEntry = postcard::from_bytes(bytes.value()).map_err(|e| Error::Storage(format!("serialization error: {e}")))?;
                if memory_type.is_none_or(|t| entry.memory_type == t) {
                    matches.push(entry);
                }
            }

            matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            matches.truncate(limit);
            Ok(matches)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let write_txn = db.begin_write().map_err(|e| Error::Storage(format!("failed to begin write txn: {e}")))?;
            {
                let id_key = id.to_string();
                let existing = {
                    let entries = write_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                    entries
                        .get(id_key.as_str())
                        .map_err(|e| Error::Storage(e.to_string()))?
                        .map(|bytes| postcard::from_bytes::<MemoryEntry>(bytes.value()))
                        .transpose()
                        .map_err(|e| Error::Storage(format!("serialization error: {e}")))?
                };
                let Some(entry) = existing else {
                    return Ok(());
                };

                let mut entries = write_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                entries.remove(id_key.as_str()).map_err(|e| Error::Storage(e.to_string()))?;

                let mut session_index = write_txn.open_table(SESSION_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                session_index
                    .remove(session_index_key(&entry.session_id, entry.id).as_str())
                    .map_err(|e| Error::Storage(e.to_string()))?;

                if let Some(hash) = entry.metadata.get("content_hash") {
                    let mut fingerprint_index =
                        write_txn.open_table(FINGERPRINT_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
                    fingerprint_index
                        .remove(fingerprint_index_key(&entry.session_id, hash).as_str())
                        .map_err(|e| Error::Storage(e.to_string()))?;
                }
            }
            write_txn.commit().map_err(|e| Error::Storage(format!("failed to commit delete txn: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn find_by_fingerprint(&self, session_id: &str, content_hash: &str) -> Result<Option<MemoryEntry>> {
        let db = Arc::clone(&self.db);
        let key = fingerprint_index_key(session_id, content_hash);
        with_db_timeout(move || {
            let read_txn = db.begin_read().map_err(|e| Error::Storage(format!("failed to begin read txn: {e}")))?;
            let fingerprint_index = read_txn.open_table(FINGERPRINT_INDEX_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
            let Some(id_bytes) = fingerprint_index.get(key.as_str()).map_err(|e| Error::Storage(e.to_string()))? else {
                return Ok(None);
            };
            let id_key = String::from_utf8_lossy(id_bytes.value()).into_owned();
            let entries = read_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
            match entries.get(id_key.as_str()).map_err(|e| Error::Storage(e.to_string()))? {
                Some(bytes) => {
                    let entry: MemoryEntry = postcard::from_bytes(bytes.value()).map_err(|e| Error::Storage(format!("serialization error: {e}")))?;
                    Ok(Some(entry))
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn stats(&self) -> Result<BackendStats> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db.begin_read().map_err(|e| Error::Storage(format!("failed to begin read txn: {e}")))?;
            let entries = read_txn.open_table(ENTRIES_TABLE).map_err(|e| Error::Storage(e.to_string()))?;
            let total_memories = entries.len().map_err(|e| Error::Storage(e.to_string()))? as usize;
            Ok(BackendStats { total_memories })
        })
        .await
    }
}

#[cfg(test)]
mod tests;
