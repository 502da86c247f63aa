//! Benchmarks for complete voice chains.
//!
//! exciter → feedback → resonator bank → stereo accumulate, for a struck
//! and a bowed setting.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::synth::{Voice, VoiceParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn voice(params: VoiceParams) -> Voice {
    let mut voice = Voice::new();
    voice.prepare(SAMPLE_RATE);
    voice.apply_params(&params);
    voice.note_on(45, 0.9, 1); // A2
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === STRUCK ===
        // Default mallet: short burst, eight modes ringing.
        let mut struck = voice(VoiceParams::default());
        group.bench_with_input(BenchmarkId::new("struck", size), &size, |b, _| {
            b.iter(|| {
                let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
                struck.process(black_box(&mut outputs), 0, size);
                struck.end_block();
            })
        });

        // === BOWED ===
        // Sustained exciter, tracking feedback at its ceiling.
        let mut bowed = voice(VoiceParams {
            exciter_sustain: 0.7,
            feedback_amount: 0.95,
            feedback_tracking: true,
            saturation_drive: 5.0,
            ..VoiceParams::default()
        });
        group.bench_with_input(BenchmarkId::new("bowed", size), &size, |b, _| {
            b.iter(|| {
                let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
                bowed.process(black_box(&mut outputs), 0, size);
                bowed.end_block();
            })
        });
    }

    group.finish();
}
