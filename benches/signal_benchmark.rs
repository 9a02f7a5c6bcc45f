/*!
 * Signal Benchmarks
 *
 * Wake latency of a parked waiter and the cost of waits on completed signals
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use readiness_signals::{DuplicatePolicy, ReadinessRegistry, Signal};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_wake_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("wake_latency");

    for waiters in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(waiters), &waiters, |b, &waiters| {
            b.iter(|| {
                let signal = Arc::new(Signal::new("bench", DuplicatePolicy::Ignore));
                let handles: Vec<_> = (0..waiters)
                    .map(|_| {
                        let signal = signal.clone();
                        thread::spawn(move || signal.wait_timeout(Duration::from_secs(1)))
                    })
                    .collect();

                signal.complete(1u64).ok();
                for handle in handles {
                    handle.join().ok();
                }
            });
        });
    }

    group.finish();
}

fn bench_completed_fast_path(c: &mut Criterion) {
    let registry = ReadinessRegistry::<u64>::new();
    registry.complete_loader_ready(42).ok();

    c.bench_function("wait_completed_signal", |b| {
        b.iter(|| black_box(registry.loader_ready().wait()))
    });

    c.bench_function("is_completed", |b| {
        b.iter(|| black_box(registry.loader_ready().is_completed()))
    });
}

criterion_group!(benches, bench_wake_latency, bench_completed_fast_path);
criterion_main!(benches);
