//! Benchmarks comparing the recursive merge sort against TimSort.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use cyclic_queue::{List, Queue};
use std::iter::FromIterator;

const SIZES: &[usize] = &[1_000, 100_000];

/// Deterministic pseudo-random keys.
fn random_keys(len: usize) -> Vec<u64> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state >> 33
        })
        .collect()
}

/// Ascending runs of 64 keys, every fourth run descending.
fn partially_sorted_keys(len: usize) -> Vec<u64> {
    let mut keys = random_keys(len);
    for (i, run) in keys.chunks_mut(64).enumerate() {
        run.sort_unstable();
        if i % 4 == 3 {
            run.reverse();
        }
    }
    keys
}

fn bench_list_sort(c: &mut Criterion) {
    let inputs: [(&str, fn(usize) -> Vec<u64>); 2] = [
        ("random", random_keys),
        ("partially_sorted", partially_sorted_keys),
    ];
    for (name, make_keys) in inputs.iter() {
        let mut group = c.benchmark_group(format!("list_sort/{}", name));
        for &len in SIZES {
            let keys = make_keys(len);
            group.throughput(Throughput::Elements(len as u64));

            group.bench_with_input(BenchmarkId::new("merge_sort", len), &keys, |b, keys| {
                b.iter_batched(
                    || List::from_iter(keys.iter().copied()),
                    |mut list| {
                        list.sort();
                        black_box(list)
                    },
                    BatchSize::LargeInput,
                );
            });

            group.bench_with_input(BenchmarkId::new("timsort", len), &keys, |b, keys| {
                b.iter_batched(
                    || List::from_iter(keys.iter().copied()),
                    |mut list| {
                        list.timsort();
                        black_box(list)
                    },
                    BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }
}

fn bench_queue_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_sort");
    let len = 10_000;
    let texts: Vec<String> = random_keys(len).iter().map(|key| format!("{:x}", key)).collect();
    group.throughput(Throughput::Elements(len as u64));

    let fill = || {
        let mut queue = Queue::new();
        for text in &texts {
            queue.insert_tail(text).unwrap();
        }
        queue
    };

    group.bench_function("merge_sort", |b| {
        b.iter_batched(
            fill,
            |mut queue| {
                queue.sort(false);
                black_box(queue)
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("timsort", |b| {
        b.iter_batched(
            fill,
            |mut queue| {
                queue.timsort();
                black_box(queue)
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_list_sort, bench_queue_sort);
criterion_main!(benches);
