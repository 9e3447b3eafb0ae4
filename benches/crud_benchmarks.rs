use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rank_bst::BstMap;
use std::collections::BTreeMap;

const N: usize = 10_000;
// Sorted input turns the tree into a path, so keep those runs small.
const SORTED_N: usize = 1_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── CRUD Benchmarks ────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert");

    for (label, keys) in [("random", random_keys(N)), ("ordered", ordered_keys(SORTED_N))] {
        group.bench_function(BenchmarkId::new("BstMap", label), |b| {
            b.iter(|| {
                let mut map = BstMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", label), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });
    }

    group.finish();
}

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bst: BstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let btree: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter(|| keys.iter().filter(|k| bst.get(*k).is_some()).count());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| keys.iter().filter(|k| btree.get(*k).is_some()).count());
    });

    group.finish();
}

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BstMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Order-Statistic Benchmarks ─────────────────────────────────────────────

fn bench_rank_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bst: BstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let btree: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let probes: Vec<i64> = keys.iter().step_by(100).copied().collect();

    let mut group = c.benchmark_group("map_rank_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter(|| probes.iter().map(|k| bst.rank(k)).sum::<usize>());
    });

    // BTreeMap has no subtree sizes, so it has to count.
    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| probes.iter().map(|k| btree.range(..*k).count()).sum::<usize>());
    });

    group.finish();
}

fn bench_floor_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bst: BstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let btree: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_floor_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter(|| keys.iter().filter_map(|k| bst.floor(&(k + 1))).count());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| keys.iter().filter_map(|k| btree.range(..=k + 1).next_back()).count());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(crud_benches, bench_insert, bench_get_random, bench_remove_random,);

criterion_group!(order_statistic_benches, bench_rank_random, bench_floor_random,);

criterion_main!(crud_benches, order_statistic_benches,);
