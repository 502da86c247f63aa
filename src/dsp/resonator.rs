//! Parallel bank of modal filters forming one timbre.
//!
//! Every mode sees the same input. The bank tags each slot as harmonic
//! (integer multiples of the fundamental, like strings and tubes) or
//! inharmonic (golden-ratio spacing, like bars, plates and bells) and
//! sums the ringing modes with equal-power scaling.
//!
//! # Tuning
//!
//! Harmonic and inharmonic slots are counted separately. With a
//! fundamental `f`, the k-th harmonic slot (1-based) rings at `k * f` and
//! the k-th inharmonic slot at `f * φ^k`:
//!
//! ```text
//! kinds:  H    H    H    H    I     I     I     I
//! freqs:  f    2f   3f   4f   fφ    fφ²   fφ³   fφ⁴
//! ```
//!
//! # Headroom
//!
//! The sum is scaled by `1/√N`. On top of that, `prepare` bounds each
//! mode's impulse peak analytically and, if a unit impulse striking every
//! mode in phase could still exceed full scale, pulls the whole bank down
//! just far enough. With ordinary decay times the guard stays at 1.0.

use crate::dsp::modal::ModalFilter;

pub const MAX_MODES: usize = 8;
pub const GOLDEN_RATIO: f32 = 1.618_033_988_749_895;
/// Modes quieter than this are left out of the sum.
pub const SILENT_MODE_THRESHOLD: f32 = 1.0e-3;
/// Worst-case peak the headroom guard aims for.
const HEADROOM_TARGET: f32 = 0.999;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Frequency = fundamental × k.
    Harmonic,
    /// Frequency = fundamental × φ^k.
    Inharmonic,
}

#[derive(Debug, Clone)]
pub struct ResonatorBank {
    modes: [ModalFilter; MAX_MODES],
    kinds: [ModeKind; MAX_MODES],
    /// Per-mode output weight: amplitude × 1/√N × headroom, 0 for silent modes.
    mix: [f32; MAX_MODES],
    active: usize,
    pending_active: usize,
    sample_rate: f32,
    headroom: f32,
}

impl Default for ResonatorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ResonatorBank {
    /// Eight modes: four harmonic followed by four inharmonic.
    pub fn new() -> Self {
        let mut bank = Self {
            modes: std::array::from_fn(|_| ModalFilter::new()),
            kinds: [ModeKind::Harmonic; MAX_MODES],
            mix: [0.0; MAX_MODES],
            active: MAX_MODES,
            pending_active: MAX_MODES,
            sample_rate: 0.0,
            headroom: 1.0,
        };
        bank.set_harmonic_count(MAX_MODES / 2);
        bank
    }

    /// Recompute every mode's coefficients and apply a pending mode count.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.active = self.pending_active;
        for mode in &mut self.modes {
            mode.prepare(sample_rate);
        }
        self.refresh_mix();
    }

    /// Number of modes summed from the next `prepare` on.
    pub fn set_active_mode_count(&mut self, count: usize) {
        self.pending_active = count.clamp(1, MAX_MODES);
    }

    pub fn active_mode_count(&self) -> usize {
        self.active
    }

    pub fn set_mode_kind(&mut self, index: usize, kind: ModeKind) {
        if let Some(slot) = self.kinds.get_mut(index) {
            *slot = kind;
        }
    }

    /// First `count` slots harmonic, the rest inharmonic.
    pub fn set_harmonic_count(&mut self, count: usize) {
        for (i, kind) in self.kinds.iter_mut().enumerate() {
            *kind = if i < count {
                ModeKind::Harmonic
            } else {
                ModeKind::Inharmonic
            };
        }
    }

    pub fn set_mode_frequency(&mut self, index: usize, hz: f32) {
        if let Some(mode) = self.modes.get_mut(index) {
            mode.configure(hz, mode.decay_ms(), self.sample_rate);
            self.refresh_mix();
        }
    }

    pub fn set_mode_decay(&mut self, index: usize, decay_ms: f32, sample_rate: f32) {
        if let Some(mode) = self.modes.get_mut(index) {
            self.sample_rate = sample_rate;
            mode.set_decay(decay_ms, sample_rate);
            self.refresh_mix();
        }
    }

    pub fn set_mode_amplitude(&mut self, index: usize, amplitude: f32) {
        if let Some(mode) = self.modes.get_mut(index) {
            mode.set_amplitude(amplitude);
            self.refresh_mix();
        }
    }

    /// Retune every slot from `fundamental` according to its kind.
    pub fn tune(&mut self, fundamental: f32) {
        let mut harmonic = 0;
        let mut inharmonic = 0;

        for (mode, kind) in self.modes.iter_mut().zip(&self.kinds) {
            let hz = match kind {
                ModeKind::Harmonic => {
                    harmonic += 1;
                    fundamental * harmonic as f32
                }
                ModeKind::Inharmonic => {
                    inharmonic += 1;
                    fundamental * GOLDEN_RATIO.powi(inharmonic)
                }
            };
            mode.configure(hz, mode.decay_ms(), self.sample_rate);
        }

        self.refresh_mix();
    }

    /// Set per-mode decay and amplitude from a base decay, a decay tilt and
    /// an amplitude rolloff. Mode k (1-based) gets `decay * k^-tilt` and
    /// amplitude `k^-rolloff`.
    pub fn shape(&mut self, decay_ms: f32, tilt: f32, rolloff: f32) {
        for (i, mode) in self.modes.iter_mut().enumerate() {
            let k = (i + 1) as f32;
            mode.set_decay(decay_ms * k.powf(-tilt), self.sample_rate);
            mode.set_amplitude(k.powf(-rolloff));
        }
        self.refresh_mix();
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let mut sum = 0.0;
        for (mode, &gain) in self.modes[..self.active].iter_mut().zip(&self.mix) {
            let y = mode.process_sample(x);
            if gain > 0.0 {
                sum += gain * y;
            }
        }
        sum
    }

    pub fn reset(&mut self) {
        for mode in &mut self.modes {
            mode.reset();
        }
    }

    /// The modes currently summed.
    pub fn modes(&self) -> &[ModalFilter] {
        &self.modes[..self.active]
    }

    pub fn mode(&self, index: usize) -> Option<&ModalFilter> {
        self.modes.get(index)
    }

    pub fn kind(&self, index: usize) -> Option<ModeKind> {
        self.kinds.get(index).copied()
    }

    /// Extra attenuation applied by the worst-case guard (1.0 = none).
    pub fn headroom(&self) -> f32 {
        self.headroom
    }

    fn refresh_mix(&mut self) {
        let norm = 1.0 / (self.active as f32).sqrt();

        let mut weights = [0.0f32; MAX_MODES];
        let mut worst = 0.0f32;
        for (i, mode) in self.modes[..self.active].iter().enumerate() {
            let amplitude = mode.amplitude();
            if amplitude >= SILENT_MODE_THRESHOLD {
                weights[i] = amplitude;
                worst += amplitude * mode.coefficients().impulse_peak_bound();
            }
        }

        let worst = worst * norm;
        self.headroom = if worst > HEADROOM_TARGET {
            HEADROOM_TARGET / worst
        } else {
            1.0
        };

        for (mix, weight) in self.mix.iter_mut().zip(weights) {
            *mix = weight * norm * self.headroom;
        }
    }
}
