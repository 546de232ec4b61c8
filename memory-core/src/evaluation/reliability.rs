//! Robustness stress tests for a memory backend: data-integrity
//! round trips, concurrent store safety, and graceful handling of
//! degenerate inputs.

use crate::memory::{MemoryCoordinator, RetrievalQuery, StorageRequest};
use crate::types::MemoryType;
use crate::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reliability evaluation results from the three stress categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    pub data_integrity_score: f64,
    pub concurrent_safety_score: f64,
    pub error_recovery_score: f64,
    pub num_tests: usize,
    pub backend_name: String,
}

/// Runs all three reliability stress tests against `coordinator`.
pub async fn evaluate(coordinator: &MemoryCoordinator, backend_name: &str) -> Result<ReliabilityMetrics> {
    let integrity = test_data_integrity(coordinator).await?;
    let concurrency = test_concurrent_safety(coordinator).await;
    let recovery = test_error_recovery(coordinator).await?;

    Ok(ReliabilityMetrics {
        data_integrity_score: integrity,
        concurrent_safety_score: concurrency,
        error_recovery_score: recovery,
        num_tests: 3,
        backend_name: backend_name.to_string(),
    })
}

async fn test_data_integrity(coordinator: &MemoryCoordinator) -> Result<f64> {
    let test_data: Vec<(String, MemoryType)> = vec![
        ("Simple text".to_string(), MemoryType::Episodic),
        ("Text with special chars: !@#$%^&*()".to_string(), MemoryType::Semantic),
        ("Multi-line\ntext\nwith\nnewlines".to_string(), MemoryType::Procedural),
        ("Unicode: 你好 мир 🎉".to_string(), MemoryType::Prospective),
        ("Very long text ".repeat(100), MemoryType::Working),
    ];
    let total = test_data.len();
    let mut successful_roundtrips = 0;

    for (content, memory_type) in test_data {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("test_memory".to_string(), "true".to_string());
        let request = StorageRequest {
            content: content.clone(),
            memory_type,
            context: [("agent_id".to_string(), "integrity-test".to_string())].into(),
            metadata,
        };
        let Some(id) = coordinator.store(request).await? else {
            continue;
        };
        if let Some(stored) = coordinator.backend().get(id).await?
            && stored.content == content
        {
            successful_roundtrips += 1;
        }
    }

    Ok(if total > 0 { successful_roundtrips as f64 / total as f64 } else { 0.0 })
}

async fn test_concurrent_safety(coordinator: &MemoryCoordinator) -> f64 {
    const NUM_CONCURRENT_OPS: usize = 10;

    let stores = (0..NUM_CONCURRENT_OPS).map(|i| async move {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("test_memory".to_string(), "true".to_string());
        metadata.insert("index".to_string(), i.to_string());
        coordinator
            .store(StorageRequest {
                content: format!("Concurrent test memory {i}"),
                memory_type: MemoryType::Episodic,
                context: [("agent_id".to_string(), "concurrency-test".to_string())].into(),
                metadata,
            })
            .await
    });

    let results = futures::future::join_all(stores).await;
    let successful = results.iter().filter(|r| matches!(r, Ok(Some(_)))).count();
    successful as f64 / NUM_CONCURRENT_OPS as f64
}

async fn test_error_recovery(coordinator: &MemoryCoordinator) -> Result<f64> {
    let mut graceful = 0;
    const TOTAL_SCENARIOS: usize = 3;

    if coordinator.backend().get(Uuid::new_v4()).await?.is_none() {
        graceful += 1;
    }

    if coordinator.retrieve(RetrievalQuery { query_text: String::new(), ..RetrievalQuery::default() }).await?.is_empty() {
        graceful += 1;
    }

    if coordinator
        .retrieve(RetrievalQuery { query_text: "test".to_string(), memory_types: Some(Vec::new()), ..RetrievalQuery::default() })
        .await?
        .is_empty()
    {
        graceful += 1;
    }

    Ok(graceful as f64 / TOTAL_SCENARIOS as f64)
}
