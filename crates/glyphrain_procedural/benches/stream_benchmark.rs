//! Benchmark for stream simulation.
//!
//! TARGET: a full 90-stream field ticks well under 0.1 ms
//!
//! Run with: cargo bench --package glyphrain_procedural --bench stream_benchmark

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glyphrain_core::{RainConfig, RainSeed, SimRng, ViewingVolume};
use glyphrain_procedural::{LaneLayout, ParticleField, Stream};

fn field(config: &RainConfig, volume: &ViewingVolume) -> Vec<Stream> {
    let layout = LaneLayout::allocate(volume.half_width, config.lanes.stream_count, &config.lanes);
    let seed = RainSeed::new(42);
    layout
        .slots()
        .map(|lane| Stream::spawn(lane, volume, config, SimRng::from_seed(seed.derive(lane.index as u64))))
        .collect()
}

fn benchmark_stream_tick(c: &mut Criterion) {
    let config = RainConfig::default();
    let volume = ViewingVolume::new(24.0, 18.0, -18.0, -6.0, -28.0);
    let mut streams = field(&config, &volume);

    let mut group = c.benchmark_group("stream_tick");
    group.throughput(Throughput::Elements(streams.len() as u64));
    group.bench_function("full_field_60hz", |b| {
        b.iter(|| {
            for stream in &mut streams {
                black_box(stream.tick(black_box(1.0 / 60.0), &volume, &config));
            }
        });
    });
    group.finish();
}

fn benchmark_particle_tick(c: &mut Criterion) {
    let config = RainConfig::default();
    let volume = ViewingVolume::new(24.0, 18.0, -18.0, -6.0, -28.0);
    let mut particles = ParticleField::new(&volume, &config.particles, SimRng::from_seed(RainSeed::new(7)));

    let mut group = c.benchmark_group("particle_tick");
    group.throughput(Throughput::Elements(particles.len() as u64));
    group.bench_function("default_field_60hz", |b| {
        b.iter(|| black_box(particles.tick(black_box(1.0 / 60.0), &volume)));
    });
    group.finish();
}

criterion_group!(benches, benchmark_stream_tick, benchmark_particle_tick);
criterion_main!(benches);
