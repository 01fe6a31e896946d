//! Packed encoding benchmarks.
//!
//! Throughput of packed integers, packed nullable doubles and boolean
//! vectors over in-memory buffers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solidify_wire::{WireReader, WireWriter};

fn bench_packed_ints(c: &mut Criterion) {
    let values: Vec<i32> = (0..4096).map(|i| (i * 7919) % 200_000 - 0x4000).collect();
    c.bench_function("packed_i32_write", |b| {
        b.iter(|| {
            let mut w = WireWriter::new(Vec::with_capacity(16 * 1024));
            for &v in &values {
                w.write_packed_i32(black_box(v)).unwrap();
            }
            w.into_inner()
        })
    });

    let mut w = WireWriter::new(Vec::new());
    for &v in &values {
        w.write_packed_i32(v).unwrap();
    }
    let encoded = w.into_inner();
    c.bench_function("packed_i32_read", |b| {
        b.iter(|| {
            let mut r = WireReader::new(black_box(encoded.as_slice()));
            for _ in 0..values.len() {
                black_box(r.read_packed_i32().unwrap());
            }
        })
    });
}

fn bench_packed_doubles(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..4096)
        .map(|i| match i % 5 {
            0 => None,
            1 => Some(f64::NAN),
            _ => Some(i as f64 * 0.25),
        })
        .collect();
    c.bench_function("packed_f64_roundtrip", |b| {
        b.iter(|| {
            let mut w = WireWriter::new(Vec::with_capacity(32 * 1024));
            for &v in &values {
                w.write_packed_f64_opt(black_box(v)).unwrap();
            }
            let bytes = w.into_inner();
            let mut r = WireReader::new(bytes.as_slice());
            for _ in 0..values.len() {
                black_box(r.read_packed_f64_opt().unwrap());
            }
        })
    });
}

fn bench_bools(c: &mut Criterion) {
    let values: Vec<bool> = (0..65_537).map(|i| i % 3 == 0).collect();
    c.bench_function("bools_roundtrip", |b| {
        b.iter(|| {
            let mut w = WireWriter::new(Vec::new());
            w.write_bools(black_box(&values)).unwrap();
            let bytes = w.into_inner();
            WireReader::new(bytes.as_slice()).read_bools(values.len()).unwrap()
        })
    });
}

criterion_group!(benches, bench_packed_ints, bench_packed_doubles, bench_bools);
criterion_main!(benches);
