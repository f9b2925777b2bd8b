//! Insert, lookup and churn benchmarks against `BTreeMap`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tagtree::{NameTree, Record, Tag};

fn generate_records(n: usize, names: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|i| {
            let name = format!("user{:04}", i % names);
            let tag: Tag = rng.gen();
            Record::new(name, tag, i % 3 == 0, "badge", "online")
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000].iter() {
        let records = generate_records(*size, size / 50);

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &records, |b, records| {
            b.iter(|| {
                let mut map: BTreeMap<(String, Tag), Record> = BTreeMap::new();
                for r in records.iter() {
                    map.entry((r.name().to_owned(), r.tag()))
                        .or_insert_with(|| r.clone());
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("NameTree", size), &records, |b, records| {
            b.iter(|| {
                let mut index = NameTree::new();
                for r in records.iter() {
                    index.insert(r.clone());
                }
                black_box(index)
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [1_000, 10_000, 100_000].iter() {
        let records = generate_records(*size, size / 50);
        let index: NameTree = records.iter().cloned().collect();
        let mut map: BTreeMap<(String, Tag), Record> = BTreeMap::new();
        for r in records.iter() {
            map.entry((r.name().to_owned(), r.tag()))
                .or_insert_with(|| r.clone());
        }

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &records, |b, records| {
            b.iter(|| {
                let mut hits = 0usize;
                for r in records.iter() {
                    if map.contains_key(&(r.name().to_owned(), r.tag())) {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        group.bench_with_input(BenchmarkId::new("NameTree", size), &records, |b, records| {
            b.iter(|| {
                let mut hits = 0usize;
                for r in records.iter() {
                    if index.contains(r.name(), r.tag()) {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    // One hot name so the tag tree sees every vacancy and rebuild.
    let records = generate_records(20_000, 1);

    group.bench_function("NameTree/remove_reinsert", |b| {
        b.iter(|| {
            let mut index: NameTree = records.iter().cloned().collect();
            for r in records.iter().step_by(2) {
                index.remove(r.name(), r.tag());
            }
            for r in records.iter().step_by(2) {
                index.insert(r.clone());
            }
            black_box(index)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_churn);
criterion_main!(benches);
