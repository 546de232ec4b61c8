//! Weighted roll-up of quality, performance, and reliability into one
//! overall score plus use-case recommendations, across one or more
//! named backends sharing the same test data.
//!
//! The original this is grounded on iterates a hardcoded backend-type
//! string list (`"sqlite"`, `"kuzu"`); this crate has one in-process
//! backend and a redb-backed one, so callers supply named
//! `(name, MemoryCoordinator)` pairs instead of backend-type strings.

use super::performance::{self, PerformanceMetrics};
use super::quality::{self, QualityMetrics};
use super::reliability::{self, ReliabilityMetrics};
use crate::memory::MemoryCoordinator;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One backend's full evaluation: quality, performance, reliability,
/// weighted overall score, and derived recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub backend_name: String,
    pub quality_metrics: QualityMetrics,
    pub performance_metrics: PerformanceMetrics,
    pub reliability_metrics: ReliabilityMetrics,
    pub overall_score: f64,
    pub recommendations: Vec<String>,
}

/// Evaluates one named backend's coordinator across all three
/// dimensions and returns its comparison report.
pub async fn evaluate_backend(name: &str, coordinator: &MemoryCoordinator) -> Result<ComparisonReport> {
    info!(backend = name, "evaluating backend");

    let test_queries = quality::create_test_set(coordinator, 50).await?;
    let quality_metrics = quality::evaluate(coordinator, name, &test_queries).await?;
    info!(backend = name, precision = quality_metrics.precision, recall = quality_metrics.recall, "quality evaluated");

    let performance_metrics = performance::evaluate(coordinator, name, None, 100).await?;
    info!(
        backend = name,
        storage_ms = performance_metrics.storage_latency_ms,
        retrieval_ms = performance_metrics.retrieval_latency_ms,
        "performance evaluated"
    );

    let reliability_metrics = reliability::evaluate(coordinator, name).await?;
    info!(
        backend = name,
        integrity = reliability_metrics.data_integrity_score,
        concurrency = reliability_metrics.concurrent_safety_score,
        "reliability evaluated"
    );

    let overall_score = calculate_overall_score(&quality_metrics, &performance_metrics, &reliability_metrics);
    let recommendations = generate_recommendations(name, &quality_metrics, &performance_metrics, &reliability_metrics);

    Ok(ComparisonReport {
        backend_name: name.to_string(),
        quality_metrics,
        performance_metrics,
        reliability_metrics,
        overall_score,
        recommendations,
    })
}

/// Evaluates every `(name, coordinator)` pair, continuing past an
/// individual backend's evaluation failure rather than aborting the
/// whole comparison.
pub async fn compare_all(backends: &[(&str, &MemoryCoordinator)]) -> Vec<ComparisonReport> {
    let mut reports = Vec::with_capacity(backends.len());
    for (name, coordinator) in backends {
        match evaluate_backend(name, coordinator).await {
            Ok(report) => reports.push(report),
            Err(err) => tracing::error!(backend = %name, %err, "failed to evaluate backend"),
        }
    }
    reports
}

fn calculate_overall_score(quality: &QualityMetrics, performance: &PerformanceMetrics, reliability: &ReliabilityMetrics) -> f64 {
    let quality_score = (quality.precision + quality.recall) / 2.0;

    let storage_ok = if performance.storage_latency_ms < 500.0 { 1.0 } else { 0.5 };
    let retrieval_ok = if performance.retrieval_latency_ms < 50.0 { 1.0 } else { 0.5 };
    let performance_score = (storage_ok + retrieval_ok) / 2.0;

    let reliability_score =
        (reliability.data_integrity_score + reliability.concurrent_safety_score + reliability.error_recovery_score) / 3.0;

    quality_score * 0.4 + performance_score * 0.3 + reliability_score * 0.3
}

fn generate_recommendations(
    backend_name: &str,
    quality: &QualityMetrics,
    performance: &PerformanceMetrics,
    reliability: &ReliabilityMetrics,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if quality.precision > 0.8 && quality.recall > 0.8 {
        recommendations.push(format!("{backend_name} excels at retrieval quality - good for knowledge-intensive tasks"));
    } else if quality.precision > 0.7 {
        recommendations.push(format!("{backend_name} has good precision - few false positives"));
    }

    if performance.storage_latency_ms < 100.0 {
        recommendations.push(format!("{backend_name} has fast storage - good for high-write workloads"));
    }
    if performance.retrieval_latency_ms < 10.0 {
        recommendations.push(format!("{backend_name} has ultra-fast retrieval - excellent for real-time queries"));
    }

    if reliability.data_integrity_score > 0.95 {
        recommendations.push(format!("{backend_name} has excellent data integrity - reliable for critical data"));
    }
    if reliability.concurrent_safety_score > 0.9 {
        recommendations.push(format!("{backend_name} handles concurrency well - safe for multi-threaded use"));
    }

    recommendations
}
