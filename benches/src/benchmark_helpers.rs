//! Common setup helpers for memory coordinator benchmarks.

use memory_core::memory::{InMemoryBackend, MemoryCoordinator};
use memory_storage_redb::RedbBackend;
use std::sync::Arc;
use tempfile::TempDir;

/// An in-memory coordinator, for benchmarking the coordinator's own
/// policy logic (quality gating, duplicate detection, ranking) without
/// disk I/O in the critical path.
#[must_use]
pub fn in_memory_coordinator(session_id: &str) -> MemoryCoordinator {
    MemoryCoordinator::new(Arc::new(InMemoryBackend::new()), Some(session_id.to_string()))
}

/// A redb-backed coordinator over a fresh temp-dir database, for
/// benchmarking end-to-end durable storage latency.
pub async fn redb_coordinator(session_id: &str) -> (MemoryCoordinator, TempDir) {
    let dir = TempDir::new().expect("failed to create temp directory");
    let backend = RedbBackend::new(&dir.path().join("bench.redb"))
        .await
        .expect("failed to open redb backend");
    let coordinator = MemoryCoordinator::new(Arc::new(backend), Some(session_id.to_string()));
    (coordinator, dir)
}
