//! End-to-end test of the memory coordinator backed by the durable
//! redb storage: a value stored through one coordinator instance must
//! survive being reopened through a fresh one over the same file.

use memory_core::memory::{InMemoryBackend, MemoryCoordinator, RetrievalQuery, StorageRequest};
use memory_core::types::MemoryType;
use memory_storage_redb::RedbBackend;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn entry_survives_coordinator_restart_over_same_redb_file() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("roundtrip.redb");

    {
        let backend = RedbBackend::new(&db_path).await.unwrap();
        let coordinator = MemoryCoordinator::new(Arc::new(backend), Some("session-a".to_string()));
        coordinator
            .store(StorageRequest {
                content: "the deployment runbook lives in ops/runbook.md".to_string(),
                memory_type: MemoryType::Semantic,
                context: HashMap::new(),
                metadata: HashMap::new(),
            })
            .await
            .unwrap();
    }

    let backend = RedbBackend::new(&db_path).await.unwrap();
    let coordinator = MemoryCoordinator::new(Arc::new(backend), Some("session-a".to_string()));
    let found = coordinator
        .retrieve(RetrievalQuery {
            query_text: "deployment runbook".to_string(),
            token_budget: 2000,
            memory_types: None,
            time_range: None,
        })
        .await
        .unwrap();

    assert!(found.iter().any(|e| e.content.contains("runbook")));
}

#[tokio::test]
async fn two_sessions_over_the_same_backend_never_see_each_others_entries() {
    let backend: Arc<dyn memory_core::memory::StorageBackend> = Arc::new(InMemoryBackend::new());
    let session_a = MemoryCoordinator::new(backend.clone(), Some("alpha".to_string()));
    let session_b = MemoryCoordinator::new(backend, Some("beta".to_string()));

    session_a
        .store(StorageRequest {
            content: "alpha-only secret project codename is nightjar".to_string(),
            memory_type: MemoryType::Episodic,
            context: HashMap::new(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap();

    let leaked = session_b
        .retrieve(RetrievalQuery {
            query_text: "nightjar".to_string(),
            token_budget: 2000,
            memory_types: None,
            time_range: None,
        })
        .await
        .unwrap();

    assert!(leaked.is_empty());
}
