//! Benchmarks for the line differ across file sizes and change densities.

use blastmerge::{diff, LineSeq};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

fn make_lines(count: usize) -> LineSeq {
    let text: String = (0..count).map(|i| format!("line {i} of generated content\n")).collect();
    LineSeq::from_text(&text)
}

fn make_modified(count: usize, modify_percent: usize) -> LineSeq {
    let modify_every = if modify_percent == 0 { usize::MAX } else { (100 / modify_percent).max(1) };
    let text: String = (0..count)
        .map(|i| {
            if i % modify_every == 0 {
                format!("line {i} CHANGED\n")
            } else {
                format!("line {i} of generated content\n")
            }
        })
        .collect();
    LineSeq::from_text(&text)
}

fn bench_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_identical");
    for size in [100usize, 500, 2_000] {
        let a = make_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| diff(black_box(&a), black_box(&a)));
        });
    }
    group.finish();
}

fn bench_sparse_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_sparse_changes");
    for size in [100usize, 500, 2_000] {
        let a = make_lines(size);
        let b = make_modified(size, 5);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b_, _| {
            b_.iter(|| diff(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

fn bench_dense_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_dense_changes");
    for size in [100usize, 500, 1_500] {
        let a = make_lines(size);
        let b = make_modified(size, 50);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b_, _| {
            b_.iter(|| diff(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_identical, bench_sparse_changes, bench_dense_changes);
criterion_main!(benches);
