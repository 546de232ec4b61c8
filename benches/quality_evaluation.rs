//! Benchmarks the retrieval-quality evaluator end to end: populating a
//! test set and scoring it, the same path `evaluation::comparison`
//! runs once per backend comparison.

use criterion::{criterion_group, criterion_main, Criterion};
use do_memory_benches::benchmark_helpers::in_memory_coordinator;
use memory_core::evaluation::quality;

fn quality_evaluate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = in_memory_coordinator("bench-session");
    let test_queries = rt
        .block_on(quality::create_test_set(&coordinator, 50))
        .unwrap();

    c.bench_function("quality_evaluate_50_memories", |b| {
        b.iter(|| {
            rt.block_on(quality::evaluate(&coordinator, "in-memory", &test_queries))
                .unwrap()
        });
    });
}

criterion_group!(benches, quality_evaluate);
criterion_main!(benches);
