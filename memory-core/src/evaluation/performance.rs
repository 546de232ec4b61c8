//! Latency, throughput, and storage-footprint evaluation for a memory
//! backend: store/retrieve timing loops plus the fixed performance
//! contracts they're checked against.

use crate::memory::{MemoryCoordinator, RetrievalQuery, StorageRequest};
use crate::types::MemoryType;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Performance evaluation results from one `evaluate` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub storage_latency_ms: f64,
    pub retrieval_latency_ms: f64,
    pub storage_throughput: f64,
    pub retrieval_throughput: f64,
    /// Always 0: this harness runs in-process, so attributing RSS to
    /// one backend under test isn't meaningful without an external
    /// profiler.
    pub memory_usage_bytes: u64,
    pub disk_usage_bytes: u64,
    pub num_memories: usize,
    pub backend_name: String,
}

/// Pass/fail against the fixed performance contracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContractCheck {
    pub storage_latency_ok: bool,
    pub retrieval_latency_ok: bool,
    pub storage_throughput_ok: bool,
    pub retrieval_throughput_ok: bool,
}

impl ContractCheck {
    #[must_use]
    pub fn all_pass(&self) -> bool {
        self.storage_latency_ok && self.retrieval_latency_ok && self.storage_throughput_ok && self.retrieval_throughput_ok
    }
}

/// Storage contract: under 500ms per store.
pub const STORAGE_LATENCY_CONTRACT_MS: f64 = 500.0;
/// Retrieval contract: under 50ms per retrieve.
pub const RETRIEVAL_LATENCY_CONTRACT_MS: f64 = 50.0;
/// Storage contract: at least 2 stores/sec.
pub const STORAGE_THROUGHPUT_CONTRACT: f64 = 2.0;
/// Retrieval contract: at least 20 retrieves/sec.
pub const RETRIEVAL_THROUGHPUT_CONTRACT: f64 = 20.0;

/// Runs `num_operations` store and retrieve round trips against
/// `coordinator`, timing each individually.
pub async fn evaluate(
    coordinator: &MemoryCoordinator,
    backend_name: &str,
    disk_path: Option<&Path>,
    num_operations: usize,
) -> Result<PerformanceMetrics> {
    let mut storage_times_ms = Vec::with_capacity(num_operations);
    for i in 0..num_operations {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("test_memory".to_string(), "true".to_string());
        metadata.insert("index".to_string(), i.to_string());
        let request = StorageRequest {
            content: format!("Performance test memory {i} with some content to store."),
            memory_type: MemoryType::Episodic,
            context: [("agent_id".to_string(), "perf-test".to_string())].into(),
            metadata,
        };
        let start = Instant::now();
        coordinator.store(request).await?;
        storage_times_ms.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    let avg_storage_latency = average(&storage_times_ms);

    let mut retrieval_times_ms = Vec::with_capacity(num_operations);
    for i in 0..num_operations {
        let query = RetrievalQuery { query_text: format!("memory {i}"), ..RetrievalQuery::default() };
        let start = Instant::now();
        coordinator.retrieve(query).await?;
        retrieval_times_ms.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    let avg_retrieval_latency = average(&retrieval_times_ms);

    let storage_throughput = if avg_storage_latency > 0.0 { 1000.0 / avg_storage_latency } else { 0.0 };
    let retrieval_throughput = if avg_retrieval_latency > 0.0 { 1000.0 / avg_retrieval_latency } else { 0.0 };

    let stats = coordinator.statistics().await?;
    let disk_usage = disk_usage(disk_path);

    Ok(PerformanceMetrics {
        storage_latency_ms: avg_storage_latency,
        retrieval_latency_ms: avg_retrieval_latency,
        storage_throughput,
        retrieval_throughput,
        memory_usage_bytes: 0,
        disk_usage_bytes: disk_usage,
        num_memories: stats.total_memories,
        backend_name: backend_name.to_string(),
    })
}

/// Runs [`evaluate`] at each of `scales`, clearing the session between
/// runs so each scale starts from a known population size.
pub async fn evaluate_scalability(
    coordinator: &MemoryCoordinator,
    backend_name: &str,
    scales: &[usize],
) -> Result<Vec<(usize, PerformanceMetrics)>> {
    let mut results = Vec::with_capacity(scales.len());
    for &scale in scales {
        coordinator.clear_all(coordinator.session_id()).await?;
        for i in 0..scale {
            let mut metadata = std::collections::HashMap::new();
            metadata.insert("test_memory".to_string(), "true".to_string());
            metadata.insert("scale".to_string(), scale.to_string());
            coordinator
                .store(StorageRequest {
                    content: format!("Scale test memory {i} at scale {scale}."),
                    memory_type: MemoryType::Episodic,
                    context: [("agent_id".to_string(), "scale-test".to_string())].into(),
                    metadata,
                })
                .await?;
        }
        let metrics = evaluate(coordinator, backend_name, None, 100).await?;
        results.push((scale, metrics));
    }
    Ok(results)
}

/// Checks `metrics` against the four fixed performance contracts.
#[must_use]
pub fn check_performance_contracts(metrics: &PerformanceMetrics) -> ContractCheck {
    ContractCheck {
        storage_latency_ok: metrics.storage_latency_ms < STORAGE_LATENCY_CONTRACT_MS,
        retrieval_latency_ok: metrics.retrieval_latency_ms < RETRIEVAL_LATENCY_CONTRACT_MS,
        storage_throughput_ok: metrics.storage_throughput >= STORAGE_THROUGHPUT_CONTRACT,
        retrieval_throughput_ok: metrics.retrieval_throughput >= RETRIEVAL_THROUGHPUT_CONTRACT,
    }
}

fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn disk_usage(path: Option<&Path>) -> u64 {
    path.and_then(|p| std::fs::metadata(p).ok()).map_or(0, |m| m.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(storage_ms: f64, retrieval_ms: f64, storage_tp: f64, retrieval_tp: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            storage_latency_ms: storage_ms,
            retrieval_latency_ms: retrieval_ms,
            storage_throughput: storage_tp,
            retrieval_throughput: retrieval_tp,
            memory_usage_bytes: 0,
            disk_usage_bytes: 0,
            num_memories: 0,
            backend_name: "test".to_string(),
        }
    }

    #[test]
    fn contracts_pass_when_under_latency_and_over_throughput_thresholds() {
        let check = check_performance_contracts(&metrics(100.0, 10.0, 10.0, 50.0));
        assert!(check.all_pass());
    }

    #[test]
    fn contract_fails_when_storage_latency_exceeds_threshold() {
        let check = check_performance_contracts(&metrics(600.0, 10.0, 10.0, 50.0));
        assert!(!check.storage_latency_ok);
        assert!(!check.all_pass());
    }

    #[test]
    fn average_of_empty_samples_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }
}
