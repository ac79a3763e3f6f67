use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use engine::LsmTree;
use tempfile::tempdir;

const N: u64 = 1_000;

fn lsm_write_no_flush(c: &mut Criterion) {
    c.bench_function("lsm_write_no_flush_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let db = LsmTree::new(dir.path(), usize::MAX, 100).unwrap();
                (dir, db)
            },
            |(_dir, mut db)| {
                for i in 0..N {
                    db.write(format!("k{}", i), "x".repeat(100)).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn lsm_write_with_flush(c: &mut Criterion) {
    c.bench_function("lsm_write_with_flush_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let db = LsmTree::new(dir.path(), 100, 10).unwrap();
                (dir, db)
            },
            |(_dir, mut db)| {
                for i in 0..N {
                    db.write(format!("k{:04}", i), "x".repeat(100)).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn lsm_read_from_segments(c: &mut Criterion) {
    c.bench_function("lsm_read_from_segments_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let mut db = LsmTree::new(dir.path(), 100, 10).unwrap();
                for i in 0..N {
                    db.write(format!("k{:04}", i), "x".repeat(100)).unwrap();
                }
                (dir, db)
            },
            |(_dir, db)| {
                for i in 0..N {
                    db.read(&format!("k{:04}", i)).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    lsm_write_no_flush,
    lsm_write_with_flush,
    lsm_read_from_segments
);
criterion_main!(benches);
