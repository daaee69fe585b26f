// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for the hot producer path and the consumer drain.
//!
//! The producer-side contract is that `log_*` adds negligible latency at
//! any call site; these benchmarks keep that honest.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;

use glimpse_diagnostics::{
    Anonymizer, BufferCapacity, DiagnosticsCollector, SystemInfo, SystemInfoProvider, UserAction,
    WarningEvent,
};

struct FixedHost;

impl SystemInfoProvider for FixedHost {
    fn system_info(&self) -> SystemInfo {
        SystemInfo {
            os: "linux".to_string(),
            os_version: "6.1".to_string(),
            cpu_arch: "x86_64".to_string(),
            cpu_cores: 8,
            ram_total_mb: 16_384,
        }
    }
}

/// Time a single non-blocking `log_action` call.
fn bench_log_action(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_logging");

    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let handle = collector.handle();

    group.bench_function("log_action", |b| {
        b.iter(|| {
            handle.log_action(black_box(UserAction::NavigateNext));
        });
        // Keep the channel from growing across iterations.
        collector.drain();
    });

    group.finish();
}

/// Time logging a warning whose argument needs path scrubbing.
fn bench_log_warning_with_scrub(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_logging");

    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let handle = collector.handle();

    group.bench_function("log_warning_scrubbed", |b| {
        b.iter(|| {
            handle.log_warning(black_box(
                WarningEvent::new("warning-file-not-found")
                    .with_args(vec!["missing /home/someone/pictures/cat.jpg".to_string()]),
            ));
        });
        collector.drain();
    });

    group.finish();
}

/// Time draining a full channel into the retained buffer.
fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_logging");

    group.bench_function("drain_1000", |b| {
        b.iter_batched(
            || {
                let collector = DiagnosticsCollector::new(BufferCapacity::default());
                let handle = collector.handle();
                for _ in 0..1000 {
                    handle.log_action(UserAction::TogglePlayback);
                }
                collector
            },
            |mut collector| {
                black_box(collector.drain());
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Time a full report build over a populated buffer.
fn bench_build_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_logging");

    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let handle = collector.handle();
    for _ in 0..500 {
        handle.log_action(UserAction::NavigateNext);
    }
    collector.drain();
    let anonymizer = Anonymizer::with_seed(1);

    group.bench_function("build_report_500", |b| {
        b.iter(|| {
            black_box(collector.build_report(&anonymizer, &FixedHost));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_log_action,
    bench_log_warning_with_scrub,
    bench_drain,
    bench_build_report
);
criterion_main!(benches);
