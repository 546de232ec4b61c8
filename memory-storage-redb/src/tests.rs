use super::*;
use memory_core::memory::MemoryQuery;
use memory_core::types::MemoryType;
use std::collections::HashMap;
use tempfile::tempdir;

fn entry(session_id: &str, content: &str, memory_type: MemoryType) -> MemoryEntry {
    let now = chrono::Utc::now();
    MemoryEntry {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        agent_id: "test-agent".to_string(),
        memory_type,
        title: MemoryEntry::title_from_content(content),
        content: content.to_string(),
        metadata: HashMap::new(),
        importance: 0.8,
        created_at: now,
        accessed_at: now,
    }
}

#[tokio::test]
async fn put_then_get_round_trips_exact_content() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    let e = entry("s1", "hello world", MemoryType::Episodic);
    let id = e.id;
    backend.put(e).await.unwrap();

    let fetched = backend.get(id).await.unwrap().unwrap();
    assert_eq!(fetched.content, "hello world");
}

#[tokio::test]
async fn get_missing_id_returns_none() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    assert!(backend.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_scoped_to_one_session_and_sorted_newest_first() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();

    let mut first = entry("s1", "first", MemoryType::Episodic);
    first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
    let second = entry("s1", "second", MemoryType::Episodic);
    let other_session = entry("s2", "other", MemoryType::Episodic);

    backend.put(first).await.unwrap();
    backend.put(second).await.unwrap();
    backend.put(other_session).await.unwrap();

    let results = backend.list(&MemoryQuery { session_id: "s1".to_string(), limit: 10, memory_type: None }).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "second");
}

#[tokio::test]
async fn delete_removes_entry_and_its_indexes() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    let e = entry("s1", "to delete", MemoryType::Episodic);
    let id = e.id;
    backend.put(e).await.unwrap();

    backend.delete(id).await.unwrap();
    assert!(backend.get(id).await.unwrap().is_none());
    let results = backend.list(&MemoryQuery { session_id: "s1".to_string(), limit: 10, memory_type: None }).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn delete_of_absent_id_is_a_no_op() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    assert!(backend.delete(Uuid::new_v4()).await.is_ok());
}

#[tokio::test]
async fn find_by_fingerprint_matches_stored_content_hash() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    let mut e = entry("s1", "fingerprinted", MemoryType::Semantic);
    e.metadata.insert("content_hash".to_string(), "abc123".to_string());
    let id = e.id;
    backend.put(e).await.unwrap();

    let found = backend.find_by_fingerprint("s1", "abc123").await.unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(backend.find_by_fingerprint("s1", "nonexistent").await.unwrap().is_none());
    assert!(backend.find_by_fingerprint("s2", "abc123").await.unwrap().is_none());
}

#[tokio::test]
async fn stats_counts_all_entries_across_sessions() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    backend.put(entry("s1", "a", MemoryType::Episodic)).await.unwrap();
    backend.put(entry("s2", "b", MemoryType::Semantic)).await.unwrap();

    let stats = backend.stats().await.unwrap();
    assert_eq!(stats.total_memories, 2);
}

#[tokio::test]
async fn list_filters_by_memory_type() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    backend.put(entry("s1", "episodic one", MemoryType::Episodic)).await.unwrap();
    backend.put(entry("s1", "semantic one", MemoryType::Semantic)).await.unwrap();

    let results = backend
        .list(&MemoryQuery { session_id: "s1".to_string(), limit: 10, memory_type: Some(MemoryType::Semantic) })
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "semantic one");
}

#[tokio::test]
async fn put_overwrites_existing_entry_with_same_id() {
    let dir = tempdir().unwrap();
    let backend = RedbBackend::new(&dir.path().join("memory.redb")).await.unwrap();
    let mut e = entry("s1", "original", MemoryType::Working);
    let id = e.id;
    backend.put(e.clone()).await.unwrap();

    e.content = "updated".to_string();
    backend.put(e).await.unwrap();

    let fetched = backend.get(id).await.unwrap().unwrap();
    assert_eq!(fetched.content, "updated");
}
