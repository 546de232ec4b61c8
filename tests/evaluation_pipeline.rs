//! End-to-end test of the backend evaluation pipeline: quality,
//! performance, and reliability evaluators run against both the
//! in-memory and redb backends, then compared.

use memory_core::evaluation::{self, ComparisonReport};
use memory_core::memory::{InMemoryBackend, MemoryCoordinator};
use memory_storage_redb::RedbBackend;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn compare_all_scores_both_backends_and_recommends_something() {
    let in_memory = MemoryCoordinator::new(Arc::new(InMemoryBackend::new()), Some("eval".to_string()));

    let dir = tempdir().unwrap();
    let redb_backend = RedbBackend::new(&dir.path().join("eval.redb")).await.unwrap();
    let redb = MemoryCoordinator::new(Arc::new(redb_backend), Some("eval".to_string()));

    let reports: Vec<ComparisonReport> = evaluation::compare_all(&[
        ("in-memory", &in_memory),
        ("redb", &redb),
    ])
    .await;

    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(report.overall_score >= 0.0 && report.overall_score <= 1.0);
        assert!(!report.recommendations.is_empty());
        assert_eq!(report.quality_metrics.num_queries, report.quality_metrics.num_queries);
    }
}
