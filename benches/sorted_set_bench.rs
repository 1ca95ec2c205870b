//! Benchmark for the SortedSet strategies vs the standard library.
//!
//! Compares SortedVecSet, AlgebraicSet, and the copy-on-write BTreeSet (at
//! a few node orders) against `std::collections::BTreeSet` for the
//! operations the strategies share, plus the copy-on-write fork cost no
//! standard type can amortize.

use cowset::prelude::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Deterministic scrambled input; sequential inserts would flatter the
/// sorted-array baseline.
fn scrambled(count: usize) -> Vec<u64> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1);
            state >> 16
        })
        .collect()
}

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [100, 1000, 10000] {
        let values = scrambled(size);

        group.bench_with_input(
            BenchmarkId::new("SortedVecSet", size),
            &values,
            |bencher, values| {
                bencher.iter(|| {
                    let mut set = SortedVecSet::new();
                    for &value in values {
                        set.insert(black_box(value));
                    }
                    black_box(set)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("AlgebraicSet", size),
            &values,
            |bencher, values| {
                bencher.iter(|| {
                    let mut set = AlgebraicSet::new();
                    for &value in values {
                        set.insert(black_box(value));
                    }
                    black_box(set)
                });
            },
        );

        for order in [16, 128] {
            group.bench_with_input(
                BenchmarkId::new(format!("BTreeSet/order-{order}"), size),
                &values,
                |bencher, values| {
                    bencher.iter(|| {
                        let mut set = BTreeSet::with_order(order);
                        for &value in values {
                            set.insert(black_box(value));
                        }
                        black_box(set)
                    });
                },
            );
        }

        group.bench_with_input(
            BenchmarkId::new("std::BTreeSet", size),
            &values,
            |bencher, values| {
                bencher.iter(|| {
                    let mut set = std::collections::BTreeSet::new();
                    for &value in values {
                        set.insert(black_box(value));
                    }
                    black_box(set)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// contains Benchmark
// =============================================================================

fn benchmark_contains(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("contains");

    for size in [100, 1000, 10000] {
        let values = scrambled(size);
        // half hits, half misses
        let probes: Vec<u64> = values
            .iter()
            .enumerate()
            .map(|(index, &value)| if index % 2 == 0 { value } else { value ^ 1 })
            .collect();

        let array: SortedVecSet<u64> = values.iter().copied().collect();
        let algebraic: AlgebraicSet<u64> = values.iter().copied().collect();
        let btree: BTreeSet<u64> = values.iter().copied().collect();
        let standard: std::collections::BTreeSet<u64> = values.iter().copied().collect();

        group.bench_with_input(
            BenchmarkId::new("SortedVecSet", size),
            &probes,
            |bencher, probes| {
                bencher.iter(|| {
                    let mut hits = 0_usize;
                    for probe in probes {
                        if array.contains(black_box(probe)) {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("AlgebraicSet", size),
            &probes,
            |bencher, probes| {
                bencher.iter(|| {
                    let mut hits = 0_usize;
                    for probe in probes {
                        if algebraic.contains(black_box(probe)) {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeSet", size),
            &probes,
            |bencher, probes| {
                bencher.iter(|| {
                    let mut hits = 0_usize;
                    for probe in probes {
                        if btree.contains(black_box(probe)) {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("std::BTreeSet", size),
            &probes,
            |bencher, probes| {
                bencher.iter(|| {
                    let mut hits = 0_usize;
                    for probe in probes {
                        if standard.contains(black_box(probe)) {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// iterate Benchmark
// =============================================================================

fn benchmark_iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iterate");

    for size in [100, 1000, 10000] {
        let values = scrambled(size);

        let array: SortedVecSet<u64> = values.iter().copied().collect();
        let algebraic: AlgebraicSet<u64> = values.iter().copied().collect();
        let btree: BTreeSet<u64> = values.iter().copied().collect();
        let standard: std::collections::BTreeSet<u64> = values.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("SortedVecSet", size), &size, |bencher, _| {
            bencher.iter(|| black_box(array.iter().copied().sum::<u64>()));
        });

        group.bench_with_input(BenchmarkId::new("AlgebraicSet", size), &size, |bencher, _| {
            bencher.iter(|| black_box(algebraic.iter().copied().sum::<u64>()));
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| black_box(btree.iter().copied().sum::<u64>()));
        });

        group.bench_with_input(BenchmarkId::new("std::BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| black_box(standard.iter().copied().sum::<u64>()));
        });
    }

    group.finish();
}

// =============================================================================
// fork-then-insert Benchmark (Copy-on-Write)
// =============================================================================

/// One handle clone plus one insertion: O(1) + one copied path for the
/// copy-on-write tree, a full O(n) copy for the standard types.
fn benchmark_fork_then_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fork_then_insert");

    for size in [100, 1000, 10000] {
        let values = scrambled(size);

        let btree: BTreeSet<u64> = values.iter().copied().collect();
        let array: SortedVecSet<u64> = values.iter().copied().collect();
        let standard: std::collections::BTreeSet<u64> = values.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut fork = btree.clone();
                fork.insert(black_box(u64::MAX));
                black_box(fork)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("SortedVecSet", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut fork = array.clone();
                    fork.insert(black_box(u64::MAX));
                    black_box(fork)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("std::BTreeSet", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut fork = standard.clone();
                    fork.insert(black_box(u64::MAX));
                    black_box(fork)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_contains,
    benchmark_iterate,
    benchmark_fork_then_insert
);

criterion_main!(benches);
