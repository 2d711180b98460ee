//! Hash table insert/search throughput against integer and text keys.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use core_collections::{Table, Text};

fn bench_int_inserts(c: &mut Criterion) {
    c.bench_function("table_insert_1000_ints", |b| {
        b.iter(|| {
            let mut t: Table<i64, i64> = Table::new();
            for i in 0..1000 {
                t.set(black_box(i), i * 2);
            }
            black_box(t.count());
        })
    });
}

fn bench_int_lookups(c: &mut Criterion) {
    let mut t: Table<i64, i64> = Table::new();
    for i in 0..1000 {
        t.set(i, i * 2);
    }
    c.bench_function("table_search_1000_ints", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(t.search(&black_box(i)));
            }
        })
    });
}

fn bench_text_keys(c: &mut Criterion) {
    let keys: Vec<Text> = (0..200).map(|i| Text::owned(&format!("key-{i}"))).collect();
    c.bench_function("table_text_keys", |b| {
        b.iter(|| {
            let mut t: Table<Text, usize> = Table::new();
            for (n, k) in keys.iter().enumerate() {
                t.set(k.clone(), n);
            }
            for k in &keys {
                black_box(t.search(k));
            }
        })
    });
}

criterion_group!(benches, bench_int_inserts, bench_int_lookups, bench_text_keys);
criterion_main!(benches);
