//! Benchmarks for the resonator bank at different mode counts.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::dsp::resonator::ResonatorBank;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn bank(modes: usize) -> ResonatorBank {
    let mut bank = ResonatorBank::new();
    bank.set_active_mode_count(modes);
    bank.prepare(SAMPLE_RATE);
    bank.tune(220.0);
    bank.shape(1_200.0, 0.5, 0.5);
    bank
}

pub fn bench_resonator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resonator");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|n| ((n * 7919) % 97) as f32 / 97.0 - 0.5).collect();

        for modes in [1, 4, 8] {
            let mut bank = bank(modes);
            group.bench_with_input(
                BenchmarkId::new(format!("{modes}_modes"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut acc = 0.0;
                        for &x in &input {
                            acc += bank.process_sample(black_box(x));
                        }
                        black_box(acc)
                    })
                },
            );
        }
    }

    // Retune + reshape is what a note-on pays.
    let mut retune = bank(8);
    group.bench_function("retune", |b| {
        b.iter(|| {
            retune.tune(black_box(330.0));
            retune.shape(black_box(900.0), 0.5, 0.5);
        })
    });

    group.finish();
}
