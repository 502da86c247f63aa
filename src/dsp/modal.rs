use std::f64::consts::TAU;

use crate::dsp::util::flush_denormal;

/*
Modal Filter
============

A single vibrating partial of a struck or bowed object, modeled as a
two-pole resonator whose impulse response is an exponentially decaying sine.

Vocabulary
----------

  mode        One resonant frequency of a physical body. A bell, bar or
              membrane is a sum of many modes, each ringing at its own
              frequency and dying away at its own rate.

  T60         Time for the mode's amplitude to fall by 60 dB (to 0.1%).
              Long T60 = metallic ring, short T60 = wooden thunk.

  pole radius How close the filter's poles sit to the unit circle (r).
              r = 1 would ring forever, r > 1 would explode. Every sample
              the ringing is multiplied by r.


The Math: Decay Time to Pole Radius
-----------------------------------

After n samples the amplitude has shrunk by r^n. We want r^(T60 * sr) to be
exactly 0.001 (-60 dB):

    r = exp(-ln(1000) / (T60 * sr))

and the resonant frequency sets the pole angle:

    w  = 2π * f / sr
    b0 = 1 - r
    a1 = -2 r cos(w)
    a2 = r²

The (1 - r) input gain keeps the peak response of every mode in the same
ballpark no matter how long it rings.


The Recurrence (Direct Form II Transposed)
------------------------------------------

    y  = b0 * x + s1
    s1 = s2 - a1 * y
    s2 = -a2 * y

Two state registers, three multiplies per sample.


Stability
---------

  - Decay time is clamped to [MIN_DECAY_MS, MAX_DECAY_MS] before the radius
    is computed, so r always lands in [0, 1).
  - Modes above NYQUIST_GUARD * sr are muted instead of aliasing.
  - State is flushed to zero once it falls into the subnormal range.
*/

/// Shortest decay the filter will accept. Anything shorter is clamped.
pub const MIN_DECAY_MS: f32 = 1.0;
/// Longest decay the filter will accept.
pub const MAX_DECAY_MS: f32 = 60_000.0;
/// Fraction of the sample rate above which a mode is muted.
pub const NYQUIST_GUARD: f32 = 0.49;
/// Lowest mode frequency. Lower requests are clamped.
pub const MIN_MODE_HZ: f32 = 1.0;

/// ln(1000): a T60 decay is a factor of 1000 in amplitude.
const T60_LOG: f64 = 6.907_755_278_982_137;

/// Second-order resonator coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalCoefficients {
    pub b0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl ModalCoefficients {
    /// Coefficients of a mode that produces no output.
    pub const SILENT: Self = Self {
        b0: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a resonator for `frequency` Hz ringing for `decay_ms`.
    ///
    /// Pure function of its inputs: the same arguments always produce
    /// bit-identical coefficients.
    pub fn design(frequency: f32, decay_ms: f32, sample_rate: f32) -> Self {
        if !(sample_rate.is_finite() && sample_rate > 0.0) || !frequency.is_finite() {
            return Self::SILENT;
        }
        if frequency >= NYQUIST_GUARD * sample_rate {
            return Self::SILENT;
        }

        let frequency = frequency.max(MIN_MODE_HZ) as f64;
        let sr = sample_rate as f64;
        let t60 = clamp_decay_ms(decay_ms) as f64 / 1000.0;

        let w = TAU * frequency / sr;
        let r = (-T60_LOG / (t60 * sr)).exp();

        Self {
            b0: (1.0 - r) as f32,
            a1: (-2.0 * r * w.cos()) as f32,
            a2: (r * r) as f32,
        }
    }

    /// Pole radius r (0 for a silent mode).
    pub fn radius(&self) -> f32 {
        self.a2.max(0.0).sqrt()
    }

    /// Upper bound on |h[n]| for a unit impulse.
    ///
    /// h[n] = b0 r^n sin((n+1)w) / sin(w), and |sin((n+1)w) / sin(w)| is
    /// bounded both by n+1 and by 1/|sin(w)|. Taking the tighter of the two
    /// gives a bound that is close to the true peak for short decays and
    /// far below 1 for long ones.
    pub fn impulse_peak_bound(&self) -> f32 {
        if self.b0 == 0.0 {
            return 0.0;
        }

        let r = self.radius() as f64;
        let growth = max_ramp_decay(r);

        let cos_w = if r > 0.0 {
            (-(self.a1 as f64) / (2.0 * r)).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let sin_w = (1.0 - cos_w * cos_w).sqrt();
        let spread = if sin_w > 1.0e-12 { 1.0 / sin_w } else { f64::MAX };

        (self.b0 as f64 * growth.min(spread)) as f32
    }
}

/// Clamp a decay time into the stable range. NaN maps to the minimum.
#[inline]
pub fn clamp_decay_ms(decay_ms: f32) -> f32 {
    if decay_ms.is_nan() {
        MIN_DECAY_MS
    } else {
        decay_ms.clamp(MIN_DECAY_MS, MAX_DECAY_MS)
    }
}

/// max over n >= 0 of (n + 1) * r^n.
fn max_ramp_decay(r: f64) -> f64 {
    if r <= 0.0 {
        return 1.0;
    }
    if r >= 1.0 {
        return f64::MAX;
    }

    // Continuous maximum sits at n = -1/ln(r) - 1; check its integer neighbours.
    let n_star = (-1.0 / r.ln() - 1.0).max(0.0);
    let ramp = |n: f64| (n + 1.0) * r.powf(n);
    ramp(n_star.floor()).max(ramp(n_star.ceil()))
}

/// One resonant mode.
#[derive(Debug, Clone)]
pub struct ModalFilter {
    frequency: f32,
    decay_ms: f32,
    sample_rate: f32,
    amplitude: f32,
    coeffs: ModalCoefficients,
    s1: f32,
    s2: f32,
}

impl Default for ModalFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalFilter {
    pub fn new() -> Self {
        Self {
            frequency: 440.0,
            decay_ms: 1000.0,
            sample_rate: 0.0,
            amplitude: 1.0,
            coeffs: ModalCoefficients::SILENT,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Set frequency, decay and sample rate and recompute coefficients.
    ///
    /// State is kept, so a ringing mode can be retuned without a click.
    pub fn configure(&mut self, frequency: f32, decay_ms: f32, sample_rate: f32) {
        self.frequency = frequency;
        self.decay_ms = clamp_decay_ms(decay_ms);
        self.sample_rate = sample_rate;
        self.coeffs = ModalCoefficients::design(frequency, self.decay_ms, sample_rate);
    }

    /// Recompute coefficients from the stored settings.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.configure(self.frequency, self.decay_ms, sample_rate);
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.configure(frequency, self.decay_ms, self.sample_rate);
    }

    pub fn set_decay(&mut self, decay_ms: f32, sample_rate: f32) {
        self.configure(self.frequency, decay_ms, sample_rate);
    }

    /// Mix weight, clamped to [0, 1].
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = if amplitude.is_nan() {
            0.0
        } else {
            amplitude.clamp(0.0, 1.0)
        };
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let ModalCoefficients { b0, a1, a2 } = self.coeffs;

        let y = b0 * x + self.s1;
        self.s1 = flush_denormal(self.s2 - a1 * y);
        self.s2 = flush_denormal(-a2 * y);

        y
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn decay_ms(&self) -> f32 {
        self.decay_ms
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn coefficients(&self) -> ModalCoefficients {
        self.coeffs
    }

    /// True when the mode was muted (above the Nyquist guard or never configured).
    pub fn is_muted(&self) -> bool {
        self.coeffs.b0 == 0.0
    }
}
