//! Storage backend abstraction the coordinator is generic over.

use super::entry::MemoryEntry;
use crate::error::Result;
use crate::types::MemoryType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// A bounded lookup against a single session's stored memories. Every
/// query is session-scoped; there is no cross-session query shape.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    pub session_id: String,
    pub limit: usize,
    pub memory_type: Option<MemoryType>,
}

/// Backend-reported capacity statistics.
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    pub total_memories: usize,
}

/// Storage contract the memory coordinator runs against. Implementors
/// own durability; the coordinator owns policy (triviality, duplicate,
/// and quality filtering; ranking; session-isolation checks).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persists one entry. Overwrites an existing entry with the same id.
    async fn put(&self, entry: MemoryEntry) -> Result<()>;

    /// Fetches a single entry by id, regardless of session.
    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>>;

    /// Lists entries for one session, most recently created first,
    /// bounded by `query.limit`.
    async fn list(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>>;

    /// Deletes an entry by id. No-op if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Finds a stored entry matching the composite duplicate
    /// fingerprint within one session: content hash, length, and the
    /// first/last 100 characters of content.
    async fn find_by_fingerprint(
        &self,
        session_id: &str,
        content_hash: &str,
    ) -> Result<Option<MemoryEntry>>;

    async fn stats(&self) -> Result<BackendStats>;
}

/// An in-process, non-durable [`StorageBackend`] used by tests and by
/// the reference [`crate::agent::Agent`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: parking_lot::RwLock<HashMap<Uuid, MemoryEntry>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn put(&self, entry: MemoryEntry) -> Result<()> {
        self.entries.write().insert(entry.id, entry);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>> {
        Ok(self.entries.read().get(&id).cloned())
    }

    async fn list(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        let mut matches: Vec<MemoryEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| e.session_id == query.session_id)
            .filter(|e| query.memory_type.is_none_or(|t| e.memory_type == t))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(query.limit.max(1));
        Ok(matches)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.entries.write().remove(&id);
        Ok(())
    }

    async fn find_by_fingerprint(
        &self,
        session_id: &str,
        content_hash: &str,
    ) -> Result<Option<MemoryEntry>> {
        Ok(self
            .entries
            .read()
            .values()
            .find(|e| {
                e.session_id == session_id
                    && e.metadata.get("content_hash").map(String::as_str) == Some(content_hash)
            })
            .cloned())
    }

    async fn stats(&self) -> Result<BackendStats> {
        Ok(BackendStats {
            total_memories: self.entries.read().len(),
        })
    }
}

/// Matches the timestamp parsing the coordinator performs when a
/// caller supplies `metadata["timestamp"]` on store: an RFC 3339
/// string, falling back to "now" if absent or unparsable.
#[must_use]
pub fn parse_or_now(raw: Option<&String>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(session: &str, mtype: MemoryType) -> MemoryEntry {
        MemoryEntry {
            id: Uuid::new_v4(),
            session_id: session.into(),
            agent_id: "agent".into(),
            memory_type: mtype,
            title: "t".into(),
            content: "content".into(),
            metadata: HashMap::new(),
            importance: 0.0,
            created_at: Utc::now(),
            accessed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_session() {
        let backend = InMemoryBackend::new();
        backend.put(entry("a", MemoryType::Episodic)).await.unwrap();
        backend.put(entry("b", MemoryType::Episodic)).await.unwrap();
        let results = backend
            .list(&MemoryQuery {
                session_id: "a".into(),
                limit: 100,
                memory_type: None,
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].session_id, "a");
    }

    #[tokio::test]
    async fn list_filters_by_memory_type() {
        let backend = InMemoryBackend::new();
        backend.put(entry("a", MemoryType::Working)).await.unwrap();
        backend.put(entry("a", MemoryType::Semantic)).await.unwrap();
        let results = backend
            .list(&MemoryQuery {
                session_id: "a".into(),
                limit: 100,
                memory_type: Some(MemoryType::Working),
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].memory_type, MemoryType::Working);
    }

    #[test]
    fn parse_or_now_falls_back_on_missing_timestamp() {
        assert!(parse_or_now(None) <= Utc::now());
    }
}
