use crate::synth::{
    params::VoiceParams,
    voice::{Voice, VoiceState},
};

/// Fixed pool of voices with oldest-first stealing.
///
/// Every allocation takes a fresh stamp from a strictly increasing counter,
/// so "oldest" is always unambiguous. The pool is sized once and never
/// grows; running out of voices means stealing, never rejecting a note.
#[derive(Debug, Clone)]
pub struct VoiceAllocator {
    voices: Vec<Voice>,
    counter: u64,
    params: VoiceParams,
}

impl VoiceAllocator {
    pub fn new(polyphony: usize) -> Self {
        Self {
            voices: (0..polyphony.max(1)).map(|_| Voice::new()).collect(),
            counter: 0,
            params: VoiceParams::default(),
        }
    }

    /// Allocate every voice's buffers for `sample_rate`. Not realtime-safe.
    pub fn prepare(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
        self.counter = 0;
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.counter += 1;
        let age = self.counter;

        let index = self
            .held_index(note)
            .or_else(|| self.voices.iter().position(|v| v.state() == VoiceState::Idle))
            .unwrap_or_else(|| self.oldest_index());

        if let Some(voice) = self.voices.get_mut(index) {
            voice.reset();
            voice.note_on(note, velocity, age);
        }
    }

    pub fn note_off(&mut self, note: u8, release_velocity: f32) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.state() == VoiceState::Active && v.note() == note)
        {
            voice.note_off(release_velocity);
        }
    }

    /// Clear the first `num_samples` of every channel, mix all voices in and
    /// close the block.
    pub fn process(&mut self, outputs: &mut [&mut [f32]], num_samples: usize) {
        for channel in outputs.iter_mut() {
            let end = num_samples.min(channel.len());
            channel[..end].fill(0.0);
        }
        self.process_range(outputs, 0, num_samples);
        self.finish_block();
    }

    /// Mix every sounding voice into `[start, start + len)` without clearing.
    ///
    /// Any number of ranges may make up one block; call
    /// [`VoiceAllocator::finish_block`] after the last one.
    pub fn process_range(&mut self, outputs: &mut [&mut [f32]], start: usize, len: usize) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.process(outputs, start, len);
        }
    }

    /// End of block: releasing voices that stayed silent for the whole block
    /// go Idle.
    pub fn finish_block(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.end_block();
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Every voice to Idle, immediately.
    pub fn panic(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    pub fn all_notes_off(&mut self) {
        self.panic();
    }

    /// Release every held note and let the resonances ring out.
    pub fn release_all(&mut self) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.state() == VoiceState::Active)
        {
            voice.note_off(0.0);
        }
    }

    pub fn set_params(&mut self, params: &VoiceParams) {
        self.params = *params;
        for voice in &mut self.voices {
            voice.apply_params(params);
        }
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    fn held_index(&self, note: u8) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.is_active() && v.note() == note)
    }

    fn oldest_index(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(index, voice)| (voice.age(), *index))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}
