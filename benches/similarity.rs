//! Benchmarks for the similarity scorer and most-similar-pair selection.

use blastmerge::{most_similar_pair, score, FileGroup, FsPort, LineSeq, RealFs};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::path::PathBuf;

fn make_lines(count: usize, salt: usize) -> LineSeq {
    let text: String =
        (0..count).map(|i| format!("line {i} content variant {}\n", (i + salt) % 7)).collect();
    LineSeq::from_text(&text)
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_score");
    for size in [100usize, 1_000, 10_000] {
        let a = make_lines(size, 0);
        let b = make_lines(size, 1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, _| {
            bencher.iter(|| score(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

fn bench_most_similar_pair(c: &mut Criterion) {
    let fs = RealFs::new();
    let mut group = c.benchmark_group("most_similar_pair");
    for k in [4usize, 8, 16] {
        let dir = tempfile::tempdir().unwrap();
        let version_set: Vec<FileGroup> = (0..k)
            .map(|i| {
                let path: PathBuf = dir.path().join(format!("v{i}.txt"));
                std::fs::write(&path, make_lines(200, i).to_text()).unwrap();
                FileGroup {
                    hash: blastmerge::hash_bytes(make_lines(200, i).to_text().as_bytes()),
                    paths: vec![path],
                    had_crlf: false,
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |bencher, _| {
            bencher.iter(|| most_similar_pair(black_box(&fs as &dyn FsPort), black_box(&version_set)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score, bench_most_similar_pair);
criterion_main!(benches);
