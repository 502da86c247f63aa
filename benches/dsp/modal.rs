//! Benchmarks for a single modal filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::dsp::modal::{ModalCoefficients, ModalFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_modal(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/modal");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|n| if n == 0 { 1.0 } else { 0.0 }).collect();

        let mut mode = ModalFilter::new();
        mode.configure(440.0, 1_500.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    acc += mode.process_sample(black_box(x));
                }
                black_box(acc)
            })
        });
    }

    // Coefficient design runs on every note-on and parameter change.
    group.bench_function("design", |b| {
        b.iter(|| {
            ModalCoefficients::design(black_box(523.25), black_box(1_200.0), black_box(SAMPLE_RATE))
        })
    });

    group.finish();
}
