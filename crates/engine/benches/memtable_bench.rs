use criterion::{criterion_group, criterion_main, Criterion};
use memtable::Memtable;

fn memtable_insert_benchmark(c: &mut Criterion) {
    c.bench_function("memtable_insert_10k", |b| {
        b.iter(|| {
            let mut m = Memtable::new();
            for i in 0..10_000 {
                m.insert(format!("k{}", i), "x".repeat(100));
            }
        });
    });
}

criterion_group!(benches, memtable_insert_benchmark);
criterion_main!(benches);
