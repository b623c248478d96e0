//! Criterion benchmarks for context_logger

use context_logger::prelude::*;
use context_logger::RecordHandler;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io;
use std::sync::Arc;

fn logger_to_sink(level: Level, json: bool) -> Logger {
    let sink = Arc::new(SyncWriter::new(io::sink()));
    let renderer: Arc<dyn Renderer> = if json {
        Arc::new(JsonRenderer::new(sink))
    } else {
        Arc::new(TextRenderer::new(sink))
    };
    Logger::builder()
        .min_level(level)
        .handler(Arc::new(RecordHandler::new(renderer)))
        .build()
}

// ============================================================================
// Level Gating Benchmarks
// ============================================================================

fn bench_disabled_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("disabled");
    group.throughput(Throughput::Elements(1));

    let logger = logger_to_sink(Level::Warn, false);
    let ctx = Context::background();

    group.bench_function("debug_call", |b| {
        b.iter(|| {
            logger.debug(&ctx, black_box("Debug message"), vec![]);
        });
    });

    group.bench_function("debug_macro", |b| {
        b.iter(|| {
            context_logger::debug!(logger, &ctx, "value {}", black_box(42));
        });
    });

    group.finish();
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission");
    group.throughput(Throughput::Elements(1));

    let ctx = Context::background()
        .with_attrs(vec![Attr::new("req_id", "abc"), Attr::new("user", 42)]);

    for (name, json) in [("text", false), ("json", true)] {
        let logger = logger_to_sink(Level::Debug, json).sublogger("svc", vec![Attr::new("env", "prod")]);
        group.bench_function(name, |b| {
            b.iter(|| {
                logger.info(
                    &ctx,
                    black_box("request handled"),
                    vec![Attr::new("status", 200), Attr::new("path", "/api/v1/items")],
                );
            });
        });
    }

    group.finish();
}

// ============================================================================
// Context Depth Benchmarks
// ============================================================================

fn bench_context_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_depth");
    let logger = logger_to_sink(Level::Debug, false);

    for depth in [1usize, 8, 32] {
        let mut ctx = Context::background();
        for i in 0..depth {
            ctx = ctx.with_attrs(vec![Attr::new(format!("k{}", i), i as u64)]);
        }
        group.bench_function(format!("depth_{}", depth), |b| {
            b.iter(|| logger.info(&ctx, "deep", vec![]));
        });
    }

    group.finish();
}

// ============================================================================
// Derivation Benchmarks
// ============================================================================

fn bench_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("derivation");
    let logger = logger_to_sink(Level::Debug, false).sublogger("root", vec![Attr::new("a", 1)]);
    let ctx = Context::background().with_attrs(vec![Attr::new("req_id", "abc")]);

    group.bench_function("sublogger", |b| {
        b.iter(|| black_box(logger.sublogger("child", vec![Attr::new("b", 2)])));
    });

    group.bench_function("context_with_attrs", |b| {
        b.iter(|| black_box(ctx.with_attrs(vec![Attr::new("step", "auth")])));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_disabled_levels,
    bench_emission,
    bench_context_depth,
    bench_derivation
);
criterion_main!(benches);
