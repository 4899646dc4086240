use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ferroflake::{
    Config, MonotonicClock, SnowflakeGenerator, SystemClock, TimeSource, configure,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Number of IDs generated per benchmark iteration (split across threads for
// the contended benchmarks).
const TOTAL_IDS: usize = 4096;

const EPOCH: i64 = 1_700_000_000_000;

fn default_config() -> Config {
    configure(EPOCH, &[1, 1]).expect("valid layout")
}

/// Benchmarks a single generator on one thread, blocking through exhaustion.
fn bench_generate<T: TimeSource>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> SnowflakeGenerator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads, up to the number of CPUs.
fn bench_generate_contended<T: TimeSource + Send + Sync>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> SnowflakeGenerator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16]
        .into_iter()
        .filter(|&n| n <= max_threads)
    {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_factory());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.generate().unwrap());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

/// Benchmarks decoding a fixed working set, with and without the cache.
fn bench_decode(c: &mut Criterion, group_name: &str, cached: bool) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let generator = SnowflakeGenerator::new(default_config());
    let ids: Vec<i64> = (0..TOTAL_IDS)
        .map(|_| generator.generate().unwrap())
        .collect();
    if cached {
        generator.enable_cache_with_capacity(TOTAL_IDS);
    }

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for &id in &ids {
                black_box(generator.decode(black_box(id)));
            }
        });
    });

    group.finish();
}

fn benchmark_generate(c: &mut Criterion) {
    bench_generate(c, "generate/system_clock", || {
        SnowflakeGenerator::with_clock(default_config(), SystemClock)
    });
    let clock = MonotonicClock::new();
    bench_generate(c, "generate/monotonic_clock", || {
        SnowflakeGenerator::with_clock(default_config(), clock.clone())
    });
}

fn benchmark_generate_contended(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generate_contended(c, "generate_contended/monotonic_clock", || {
        SnowflakeGenerator::with_clock(default_config(), clock.clone())
    });
}

fn benchmark_decode(c: &mut Criterion) {
    bench_decode(c, "decode/uncached", false);
    bench_decode(c, "decode/cached", true);
}

criterion_group!(
    benches,
    benchmark_generate,
    benchmark_generate_contended,
    benchmark_decode,
);
criterion_main!(benches);
