//! Benchmark suite for the memory coordinator and evaluation pipeline.

pub mod benchmark_helpers;

use criterion::async_executor::AsyncExecutor;
use std::future::Future;

/// Tokio-based executor for Criterion benchmarks.
///
/// Unlike `FuturesExecutor`, this provides a full tokio runtime, which
/// is required for code using `tokio::spawn` or `spawn_blocking`.
pub struct TokioExecutor;

impl AsyncExecutor for TokioExecutor {
    fn block_on<T>(&self, future: impl Future<Output = T>) -> T {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to create tokio runtime")
            .block_on(future)
    }
}
