//! Benchmarks for the saturating feedback loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::dsp::feedback::FeedbackLoop;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_feedback(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/feedback");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|n| ((n * 31) % 17) as f32 / 17.0 - 0.5).collect();

        let mut fb = FeedbackLoop::new();
        fb.prepare(SAMPLE_RATE);
        fb.set_feedback_amount(0.9);
        fb.set_saturation_drive(4.0);
        fb.set_delay_time(7.5, SAMPLE_RATE);

        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    acc += fb.process_sample(black_box(x));
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
