use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use ostreap::OSTreapSet;
use std::collections::BTreeSet;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Key sequences ──────────────────────────────────────────────────────────

fn key_patterns() -> [(&'static str, Vec<i64>); 3] {
    let ordered: Vec<i64> = (0..N as i64).collect();
    let reverse: Vec<i64> = ordered.iter().rev().copied().collect();

    // Deterministic LCG so runs are comparable.
    let mut x: u64 = 12345;
    let random = (0..N)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            (x >> 33) as i64
        })
        .collect();

    [("ordered", ordered), ("reverse", reverse), ("random", random)]
}

// ─── CRUD ───────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_insert");

    for (pattern, keys) in key_patterns() {
        group.bench_with_input(BenchmarkId::new("OSTreapSet", pattern), &keys, |b, keys| {
            b.iter(|| {
                let mut set = OSTreapSet::with_seed(7);
                for &k in keys {
                    set.insert(k);
                }
                set
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", pattern), &keys, |b, keys| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &k in keys {
                    set.insert(k);
                }
                set
            });
        });
    }

    group.finish();
}

fn bench_bulk_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_collect");

    for (pattern, keys) in key_patterns() {
        group.bench_with_input(BenchmarkId::new("OSTreapSet", pattern), &keys, |b, keys| {
            b.iter(|| keys.iter().copied().collect::<OSTreapSet<i64>>());
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", pattern), &keys, |b, keys| {
            b.iter(|| keys.iter().copied().collect::<BTreeSet<i64>>());
        });
    }

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_contains");

    for (pattern, keys) in key_patterns() {
        let os_set: OSTreapSet<i64> = keys.iter().copied().collect();
        let bt_set: BTreeSet<i64> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("OSTreapSet", pattern), &keys, |b, keys| {
            b.iter(|| keys.iter().filter(|&&k| os_set.contains(&k)).count());
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", pattern), &keys, |b, keys| {
            b.iter(|| keys.iter().filter(|&&k| bt_set.contains(&k)).count());
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_remove");

    for (pattern, keys) in key_patterns() {
        group.bench_with_input(BenchmarkId::new("OSTreapSet", pattern), &keys, |b, keys| {
            b.iter_batched(
                || keys.iter().copied().collect::<OSTreapSet<i64>>(),
                |mut set| {
                    for k in keys {
                        set.remove(k);
                    }
                    set
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", pattern), &keys, |b, keys| {
            b.iter_batched(
                || keys.iter().copied().collect::<BTreeSet<i64>>(),
                |mut set| {
                    for k in keys {
                        set.remove(k);
                    }
                    set
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_remove_at(c: &mut Criterion) {
    let keys: Vec<i64> = (0..N as i64).collect();

    c.bench_function("set_remove_at_middle", |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<OSTreapSet<i64>>(),
            |mut set| {
                while !set.is_empty() {
                    let middle = set.select(set.len() / 2).position();
                    black_box(set.remove_at(middle).ok());
                }
                set
            },
            BatchSize::SmallInput,
        );
    });
}

// ─── Order statistics ───────────────────────────────────────────────────────

// BTreeSet has no rank queries; sampled linear scans stand in for them.
const SAMPLE_STEP: usize = 97;

fn bench_select(c: &mut Criterion) {
    let os_set: OSTreapSet<i64> = (0..N as i64).collect();
    let bt_set: BTreeSet<i64> = (0..N as i64).collect();

    let mut group = c.benchmark_group("set_select");

    group.bench_function(BenchmarkId::new("OSTreapSet", N), |b| {
        b.iter(|| (0..N).step_by(SAMPLE_STEP).filter_map(|r| os_set.get_by_rank(r)).sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| (0..N).step_by(SAMPLE_STEP).filter_map(|r| bt_set.iter().nth(r)).sum::<i64>());
    });

    group.finish();
}

fn bench_rank_of(c: &mut Criterion) {
    let os_set: OSTreapSet<i64> = (0..N as i64).collect();
    let bt_set: BTreeSet<i64> = (0..N as i64).collect();

    let mut group = c.benchmark_group("set_rank_of");

    group.bench_function(BenchmarkId::new("OSTreapSet", N), |b| {
        b.iter(|| (0..N as i64).step_by(SAMPLE_STEP).filter_map(|k| os_set.rank_of(&k)).sum::<usize>());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| (0..N as i64).step_by(SAMPLE_STEP).map(|k| bt_set.range(..k).count()).sum::<usize>());
    });

    group.finish();
}

fn bench_cursor_offset(c: &mut Criterion) {
    let set: OSTreapSet<i64> = (0..N as i64).collect();

    c.bench_function("cursor_offset", |b| {
        b.iter(|| {
            let mut cursor = set.begin();
            while !cursor.is_end() {
                cursor += SAMPLE_STEP;
            }
            cursor
        });
    });
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(crud_benches, bench_insert, bench_bulk_build, bench_contains, bench_remove, bench_remove_at);

criterion_group!(order_statistic_benches, bench_select, bench_rank_of, bench_cursor_offset);

criterion_main!(crud_benches, order_statistic_benches);
