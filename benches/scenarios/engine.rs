//! Benchmarks for the full engine with every voice sounding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resona::{
    synth::{ModalSynth, NoMessages, NoteEvent},
    EngineConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let config = EngineConfig {
            sample_rate: SAMPLE_RATE,
            max_block_size: size,
            polyphony: 16,
        };
        let mut synth = ModalSynth::new(&config, NoMessages);
        if synth.prepare(SAMPLE_RATE, size).is_err() {
            continue;
        }
        synth.set_parameter("exciterSustain", 0.5);
        for note in 48..64 {
            let _ = synth.handle_event(NoteEvent::note_on(note, 0.8));
        }

        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("16_voices", size), &size, |b, _| {
            b.iter(|| {
                let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
                synth.process(black_box(&mut outputs), size);
            })
        });
    }

    group.finish();
}
