//! Benchmarks for the noise-burst exciter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::dsp::exciter::Exciter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_exciter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/exciter");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Bowed: sustain keeps the noise running every sample.
        let mut exciter = Exciter::new();
        exciter.prepare(SAMPLE_RATE);
        exciter.set_sustain(0.8);
        exciter.note_on(1.0);
        group.bench_with_input(BenchmarkId::new("sustained", size), &size, |b, _| {
            b.iter(|| {
                exciter.render(black_box(&mut buffer));
            })
        });

        // Idle: the cost of a finished strike.
        let mut idle = Exciter::new();
        idle.prepare(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
