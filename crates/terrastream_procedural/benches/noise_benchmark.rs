//! Benchmark for noise generation performance.
//!
//! TARGET: 1,000,000 simplex samples per second, one 256×256 fractal field
//! in well under a frame
//!
//! Run with: cargo bench --package terrastream_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use terrastream_procedural::fractal::{generate_fractal_noise, generate_white_noise};
use terrastream_procedural::noise::{SimplexNoise, WorldSeed};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_million_samples(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    let mut group = c.benchmark_group("million_samples");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_noise_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                let x = (i % 1000) as f64 * 0.1;
                let y = (i / 1000) as f64 * 0.1;
                black_box(noise.sample(x, y));
            }
        });
    });

    group.finish();
}

fn benchmark_octaved_noise(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("octaved_noise_6_octaves", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.octaved(black_box(x), black_box(x * 0.7), 6, 0.5, 2.0))
        });
    });
}

fn benchmark_white_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("white_noise");
    group.throughput(Throughput::Elements(256 * 256));

    group.bench_function("256x256_white_noise", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(generate_white_noise(256, 256, seed))
        });
    });

    group.finish();
}

fn benchmark_fractal_noise(c: &mut Criterion) {
    let base = generate_white_noise(256, 256, 42).expect("valid dimensions");

    let mut group = c.benchmark_group("fractal_noise");
    group.throughput(Throughput::Elements(256 * 256));

    for octaves in [4u32, 6, 8] {
        group.bench_function(format!("256x256_{octaves}_octaves"), |b| {
            b.iter(|| black_box(generate_fractal_noise(black_box(&base), octaves, 0.5)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_million_samples,
    benchmark_octaved_noise,
    benchmark_white_noise,
    benchmark_fractal_noise
);
criterion_main!(benches);
