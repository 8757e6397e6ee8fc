// benches/codec_bench.rs
// ============================================================================
// Codec + Binner Benchmark
// ============================================================================

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use spike_convert::aer::{decode_2d, decode_3d, encode_2d, encode_3d};
use spike_convert::{to_tensor, SpikeEventSet};

fn generate_events_2d(size: usize) -> SpikeEventSet {
    let mut rng = rand::thread_rng();
    let x: Vec<u32> = (0..size).map(|_| rng.gen_range(0..34)).collect();
    let y: Vec<u32> = (0..size).map(|_| rng.gen_range(0..34)).collect();
    let p: Vec<u32> = (0..size).map(|_| rng.gen_range(0..2)).collect();
    let t: Vec<f64> = (0..size).map(|_| rng.gen_range(0..300_000) as f64 / 1000.0).collect();
    SpikeEventSet::new_2d(x, y, p, t).expect("equal column lengths")
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("AER");

    for size in [1_000, 10_000, 100_000, 1_000_000].iter() {
        let events = generate_events_2d(*size);
        let bytes_2d = encode_2d(&events).expect("2D events");
        let bytes_3d = encode_3d(&events).expect("2D events");

        group.bench_with_input(BenchmarkId::new("encode_2d", size), &events, |b, e| {
            b.iter(|| black_box(encode_2d(e)))
        });
        group.bench_with_input(BenchmarkId::new("decode_2d", size), &bytes_2d, |b, d| {
            b.iter(|| black_box(decode_2d(d)))
        });
        group.bench_with_input(BenchmarkId::new("decode_3d", size), &bytes_3d, |b, d| {
            b.iter(|| black_box(decode_3d(d)))
        });
    }

    group.finish();
}

fn bench_binner(c: &mut Criterion) {
    let mut group = c.benchmark_group("Binner");

    for size in [1_000, 10_000, 100_000].iter() {
        let events = generate_events_2d(*size);
        let shape = [2usize, 34, 34, 300];

        group.bench_with_input(BenchmarkId::new("to_tensor", size), &events, |b, e| {
            b.iter(|| black_box(to_tensor(e, 1.0, Some(&shape))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codecs, bench_binner);
criterion_main!(benches);
