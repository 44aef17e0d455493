use cami_fs::io::{self, RobustnessConfig};
use cami_fs::{content_hash, metadata_hash};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tempfile::tempdir;

fn agent_document() -> String {
    let mut doc = String::from("---\nname: bench\nversion: 1.0.0\ndescription: Bench agent\n---\n");
    for i in 0..200 {
        doc.push_str(&format!("Line {i} of the body   \r\n\r\n\r\n"));
    }
    doc
}

fn hash_benchmark(c: &mut Criterion) {
    let doc = agent_document();
    c.bench_function("checksum::content_hash", |b| {
        b.iter(|| content_hash(black_box(&doc)))
    });
    c.bench_function("checksum::metadata_hash", |b| {
        b.iter(|| metadata_hash(black_box(&doc)).unwrap())
    });
}

fn write_atomic_benchmark(c: &mut Criterion) {
    c.bench_function("io::write_atomic", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_file.yaml");
        let config = RobustnessConfig::default();

        b.iter(|| {
            io::write_atomic(black_box(&path), black_box(b"version: '1'\n"), config).unwrap();
        })
    });
}

criterion_group!(benches, hash_benchmark, write_atomic_benchmark);
criterion_main!(benches);
