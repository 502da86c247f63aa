use crate::MIN_TIME;

/*
Exciter Envelope
================

A linear ADSR shaping how hard the exciter drives the resonators. Where a
subtractive synth uses the envelope to shape the final amplitude, here it
shapes the *energy injected* into the body: the resonators keep ringing on
their own after the envelope has closed.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). It multiplies
              the exciter's noise before it reaches the resonator bank.

  stage       Idle, Attack, Decay, Sustain or Release.

  gate        note_on raises it (Attack), note_off drops it (Release from
              wherever we are).

  increment   How much `level` moves per sample:
                  increment = change / (time_seconds * sample_rate)


Struck vs Bowed
---------------

  sustain = 0     Attack ramps up, Decay falls straight back to zero: a
                  short noise burst, like a mallet hitting a bar.

                    1.0 ┐ ╱╲
                        │╱  ╲
                    0.0 └────╲────────→

  sustain > 0     The envelope holds while the key is down and the exciter
                  keeps feeding the body, like a bow on a string.

                    1.0 ┐ ╱╲
                    S   │╱  ╲_________
                    0.0 └─────────────╲──→


Release
-------

note_off snapshots the current level and interpolates linearly to zero
over the release time, so releasing during the attack never clicks. The
release time can be scaled per note (release velocity).
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Ramping down to sustain level
    Sustain, // Holding while the gate is high
    Release, // Gate went low, ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,
    decay_start_level: f32,

    // Release bookkeeping, pre-calculated at note_off
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.001, 0.025, 0.0, 0.04)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),
            sample_rate: 48_000.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = seconds.max(MIN_TIME);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = seconds.max(MIN_TIME);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level.clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = seconds.max(MIN_TIME);
    }

    /// Gate high: restart the attack from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: release from the current level.
    pub fn note_off(&mut self) {
        self.note_off_scaled(1.0);
    }

    /// Gate low with the release time multiplied by `scale`.
    pub fn note_off_scaled(&mut self, scale: f32) {
        if matches!(self.stage, EnvelopeState::Idle) {
            return;
        }

        self.release_start_level = self.level;

        let release = (self.release_time * scale.max(0.0)).max(MIN_TIME);
        self.release_total_samples = (release * self.sample_rate).round().max(1.0) as u32;

        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let increment = 1.0 / (self.attack_time * self.sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * self.sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = if target > 0.0 {
                        EnvelopeState::Sustain
                    } else {
                        EnvelopeState::Idle
                    };
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
