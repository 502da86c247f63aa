use std::f32::consts::FRAC_PI_4;

use crate::{
    dsp::{exciter::Exciter, feedback::FeedbackLoop, resonator::ResonatorBank},
    io::converter::midi_note_to_freq,
    synth::params::VoiceParams,
};

/// Peak below which a releasing voice counts as silent.
///
/// Measured over a whole processing block: [`Voice::process`] may run several
/// times per block and only [`Voice::end_block`] compares against the floor.
pub const SILENCE_FLOOR: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Active,    // Key held
    Releasing, // Key released, resonances ringing out
}

/// One note: exciter → feedback loop → resonator bank.
#[derive(Debug, Clone)]
pub struct Voice {
    note: u8,
    velocity: f32,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    params: VoiceParams,
    gains: (f32, f32),
    block_peak: f32,

    exciter: Exciter,
    feedback: FeedbackLoop,
    bank: ResonatorBank,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    pub fn new() -> Self {
        Self {
            note: 0,
            velocity: 0.0,
            state: VoiceState::Idle,
            age: 0,
            sample_rate: 0.0,
            params: VoiceParams::default(),
            gains: (FRAC_PI_4.cos(), FRAC_PI_4.sin()),
            block_peak: 0.0,
            exciter: Exciter::new(),
            feedback: FeedbackLoop::new(),
            bank: ResonatorBank::new(),
        }
    }

    /// Allocate buffers and recompute coefficients. Not realtime-safe.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.exciter.prepare(sample_rate);
        self.feedback.prepare(sample_rate);
        self.bank.prepare(sample_rate);
        let params = self.params;
        self.apply_params(&params);
        self.reset();
    }

    pub fn note_on(&mut self, note: u8, velocity: f32, age: u64) {
        self.note = note;
        self.velocity = velocity;
        self.state = VoiceState::Active;
        self.age = age;

        let params = self.params;
        let fundamental = midi_note_to_freq(note);

        self.feedback.reset();
        self.bank.reset();
        self.bank.set_active_mode_count(params.mode_count);
        self.bank.set_harmonic_count(params.harmonic_modes);
        self.bank.prepare(self.sample_rate);
        self.bank.tune(fundamental);
        self.bank.shape(params.decay_ms, params.decay_tilt, params.mode_rolloff);

        self.set_feedback_delay();
        self.gains = pan_gains(note, params.stereo_width);

        self.exciter.note_on(velocity);
    }

    /// Key released; `release_velocity` in [0, 1] shortens the exciter release.
    pub fn note_off(&mut self, release_velocity: f32) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            let velocity = if release_velocity.is_nan() {
                0.0
            } else {
                release_velocity.clamp(0.0, 1.0)
            };
            self.exciter.note_off_scaled(1.0 - 0.5 * velocity);
        }
    }

    /// Push new settings. Mode count and layout wait for the next note.
    pub fn apply_params(&mut self, params: &VoiceParams) {
        self.params = *params;

        self.exciter.set_attack_ms(params.exciter_attack_ms);
        self.exciter.set_decay_ms(params.exciter_decay_ms);
        self.exciter.set_sustain(params.exciter_sustain);
        self.exciter.set_release_ms(params.exciter_release_ms);
        self.exciter.set_color(params.exciter_color);

        self.feedback.set_feedback_amount(params.feedback_amount);
        self.feedback.set_saturation_drive(params.saturation_drive);
        self.set_feedback_delay();

        if self.state != VoiceState::Idle {
            self.bank
                .shape(params.decay_ms, params.decay_tilt, params.mode_rolloff);
            self.gains = pan_gains(self.note, params.stereo_width);
        }
    }

    fn set_feedback_delay(&mut self) {
        let delay_ms = if self.params.feedback_tracking {
            1_000.0 / midi_note_to_freq(self.note)
        } else {
            self.params.feedback_delay_ms
        };
        self.feedback.set_delay_time(delay_ms, self.sample_rate);
    }

    /// Render `num_samples` starting at `start`, adding into every channel.
    ///
    /// Channel 0 takes the left gain, channel 1 the right, and a single
    /// channel gets the unpanned signal. Buffers are never cleared here.
    pub fn process(&mut self, outputs: &mut [&mut [f32]], start: usize, num_samples: usize) {
        if self.state == VoiceState::Idle {
            return;
        }

        let end = outputs
            .iter()
            .map(|channel| channel.len())
            .min()
            .unwrap_or(0)
            .min(start + num_samples);

        let (left, right) = self.gains;
        let mono = outputs.len() == 1;
        let mut block_peak = self.block_peak;

        for i in start..end {
            let excitation = self.exciter.process_sample();
            let coupled = self.feedback.process_sample(excitation);
            let y = self.bank.process_sample(coupled);
            block_peak = block_peak.max(y.abs());

            if mono {
                outputs[0][i] += y;
            } else {
                for (ch, channel) in outputs.iter_mut().enumerate() {
                    channel[i] += if ch % 2 == 0 { y * left } else { y * right };
                }
            }
        }

        self.block_peak = block_peak;
    }

    /// Close the current block. A releasing voice whose peak over every
    /// `process` call since the last `end_block` stayed under
    /// [`SILENCE_FLOOR`] goes Idle.
    pub fn end_block(&mut self) {
        if self.state == VoiceState::Releasing
            && self.block_peak < SILENCE_FLOOR
            && !self.exciter.is_active()
        {
            self.reset();
        }
        self.block_peak = 0.0;
    }

    /// Silence immediately and return to Idle.
    pub fn reset(&mut self) {
        self.state = VoiceState::Idle;
        self.velocity = 0.0;
        self.block_peak = 0.0;
        self.exciter.reset();
        self.feedback.reset();
        self.bank.reset();
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Idle
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Allocation order stamp; larger is newer.
    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn bank(&self) -> &ResonatorBank {
        &self.bank
    }

    pub fn feedback(&self) -> &FeedbackLoop {
        &self.feedback
    }
}

/// Equal-power pan gains. Notes spread left to right around E4, scaled by
/// `width`; width 0 puts everything in the centre.
fn pan_gains(note: u8, width: f32) -> (f32, f32) {
    let spread = ((note as f32 - 64.0) / 64.0).clamp(-1.0, 1.0) * width.clamp(0.0, 1.0);
    let angle = (spread + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::util::peak;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn voice() -> Voice {
        let mut voice = Voice::new();
        voice.prepare(SAMPLE_RATE);
        voice
    }

    fn render(voice: &mut Voice, len: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; len];
        let mut right = vec![0.0; len];
        {
            let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
            voice.process(&mut outputs, 0, len);
        }
        voice.end_block();
        (left, right)
    }

    #[test]
    fn note_on_sounds_and_tunes_the_bank() {
        let mut voice = voice();
        voice.note_on(69, 1.0, 1);
        assert_eq!(voice.state(), VoiceState::Active);
        assert!((voice.bank().modes()[0].frequency() - 440.0).abs() < 0.01);

        let (left, right) = render(&mut voice, 2_048);
        assert!(peak(&left) > 0.0 && peak(&right) > 0.0);
        assert!(left.iter().chain(&right).all(|x| x.is_finite()));
    }

    #[test]
    fn accumulates_instead_of_overwriting() {
        let mut clean = voice();
        clean.note_on(60, 1.0, 1);
        let mut dry = vec![0.0; 256];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut dry];
            clean.process(&mut outputs, 0, 256);
        }

        let mut busy = voice();
        busy.note_on(60, 1.0, 1);
        let mut buffer = vec![10.0; 256];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut buffer];
            busy.process(&mut outputs, 0, 256);
        }

        for (mixed, alone) in buffer.iter().zip(&dry) {
            assert_eq!(*mixed, 10.0 + alone);
        }
        assert!(peak(&dry) > 0.0);
    }

    #[test]
    fn renders_only_the_requested_range() {
        let mut voice = voice();
        voice.note_on(60, 1.0, 1);

        let mut buffer = vec![0.0; 512];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut buffer];
            voice.process(&mut outputs, 128, 256);
        }
        assert!(buffer[..128].iter().all(|&x| x == 0.0));
        assert!(buffer[384..].iter().all(|&x| x == 0.0));
        assert!(peak(&buffer[128..384]) > 0.0);
    }

    #[test]
    fn release_rings_out_then_goes_idle() {
        let mut voice = voice();
        let mut params = VoiceParams::default();
        params.decay_ms = 50.0;
        params.feedback_amount = 0.0;
        voice.apply_params(&params);

        voice.note_on(60, 1.0, 1);
        render(&mut voice, 512);
        voice.note_off(0.0);
        assert_eq!(voice.state(), VoiceState::Releasing);

        for _ in 0..100 {
            render(&mut voice, 512);
        }
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn split_block_is_judged_on_its_whole_peak() {
        let mut voice = voice();
        let params = VoiceParams {
            decay_ms: 5_000.0,
            ..VoiceParams::default()
        };
        voice.apply_params(&params);
        voice.note_on(36, 1.0, 1);
        render(&mut voice, 512);
        voice.note_off(0.0);
        for _ in 0..10 {
            render(&mut voice, 512);
        }
        assert_eq!(voice.state(), VoiceState::Releasing);

        let mut buffer = vec![0.0; 512];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut buffer];
            voice.process(&mut outputs, 0, 0);
            for i in 0..512 {
                voice.process(&mut outputs, i, 1);
                assert_eq!(voice.state(), VoiceState::Releasing);
            }
        }
        voice.end_block();

        assert!(peak(&buffer) > SILENCE_FLOOR);
        assert_eq!(voice.state(), VoiceState::Releasing);
    }

    #[test]
    fn idle_voice_adds_nothing() {
        let mut voice = voice();
        let (left, right) = render(&mut voice, 256);
        assert!(left.iter().chain(&right).all(|&x| x == 0.0));
    }

    #[test]
    fn tracking_sets_delay_to_the_note_period() {
        let mut voice = voice();
        let params = VoiceParams {
            feedback_tracking: true,
            ..VoiceParams::default()
        };
        voice.apply_params(&params);
        voice.note_on(69, 1.0, 1);

        // 1000 / 440 Hz ≈ 2.27 ms ≈ 109 samples
        assert_eq!(voice.feedback().delay_samples(), 109);
    }

    #[test]
    fn pan_is_equal_power() {
        for note in [0, 30, 64, 100, 127] {
            let (l, r) = pan_gains(note, 1.0);
            assert!((l * l + r * r - 1.0).abs() < 1.0e-5);
        }
        let (l, r) = pan_gains(100, 0.0);
        assert!((l - r).abs() < 1.0e-6);
    }
}
