use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
One-Pole Filter (TPT)
=====================

The gentlest filter there is: 6 dB per octave, no resonance, one state
register. It is what the exciter uses as its "color" control (how bright
the noise burst is) and what the feedback loop uses to keep DC from
building up.

Topology-Preserving Transform
-----------------------------

Like the state-variable filter it descends from, the cutoff is pre-warped
with tan() so the digital filter's -3 dB point lands exactly where the
analog prototype's would:

    g = tan(π * fc / sr)
    G = g / (1 + g)

    v  = (x - s) * G
    lp = v + s
    s  = lp + v
    hp = x - lp

Lowpass and highpass come out of the same computation, so one filter serves
both jobs.

| type      | passes       | rejects      | used for            |
| --------- | ------------ | ------------ | ------------------- |
| low-pass  | below cutoff | above cutoff | exciter brightness  |
| high-pass | above cutoff | below cutoff | feedback DC blocker |
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    cutoff_hz: f32,
    sample_rate: f32,
    gain: f32,
    filter_type: FilterType,
}

impl OnePole {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            cutoff_hz,
            sample_rate: 48_000.0,
            gain: 0.0,
            filter_type,
        };
        filter.update_gain();
        filter
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_gain();
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.update_gain();
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    #[inline]
    fn update_gain(&mut self) {
        let nyquist_guard = 0.49 * self.sample_rate;
        let fc = if self.cutoff_hz.is_nan() {
            nyquist_guard
        } else {
            self.cutoff_hz.clamp(1.0, nyquist_guard)
        };
        let g = (PI * fc / self.sample_rate).tan();
        self.gain = g / (1.0 + g);
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let v = (sample - self.state) * self.gain;
        let lowpass = v + self.state;
        self.state = crate::dsp::util::flush_denormal(lowpass + v);

        FilterOutputs {
            lowpass,
            highpass: sample - lowpass,
        }
    }

    /// Filter one sample with the configured response.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let outputs = self.next_sample(sample);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        buffer[buffer.len() / 2..]
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = OnePole::lowpass(500.0);
        filter.prepare(SAMPLE_RATE);
        let mut buffer = vec![1.0; 2_048];
        filter.render(&mut buffer);
        assert!(buffer[2_047] > 0.99);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = OnePole::highpass(20.0);
        filter.prepare(SAMPLE_RATE);
        let mut buffer = vec![1.0; 48_000];
        filter.render(&mut buffer);
        assert!(buffer[47_999].abs() < 0.001);
    }

    #[test]
    fn cutoff_is_the_half_power_point() {
        let cutoff = 1_000.0;
        let mut filter = OnePole::lowpass(cutoff);
        filter.prepare(SAMPLE_RATE);

        let mut buffer = sine(cutoff, 9_600);
        filter.render(&mut buffer);
        let peak = peak_after_transient(&buffer);
        assert!((peak - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "got {peak}");
    }

    #[test]
    fn higher_cutoff_is_brighter() {
        let test_freq = 8_000.0;

        let mut dark = OnePole::lowpass(500.0);
        dark.prepare(SAMPLE_RATE);
        let mut dark_buffer = sine(test_freq, 4_800);
        dark.render(&mut dark_buffer);

        let mut bright = OnePole::lowpass(12_000.0);
        bright.prepare(SAMPLE_RATE);
        let mut bright_buffer = sine(test_freq, 4_800);
        bright.render(&mut bright_buffer);

        assert!(
            peak_after_transient(&bright_buffer) > 2.0 * peak_after_transient(&dark_buffer),
            "raising the cutoff should pass more high-frequency energy"
        );
    }

    #[test]
    fn cutoff_is_clamped_below_nyquist() {
        let mut filter = OnePole::lowpass(100_000.0);
        filter.prepare(SAMPLE_RATE);
        let mut buffer = sine(440.0, 1_024);
        filter.render(&mut buffer);
        assert!(buffer.iter().all(|x| x.is_finite()));
    }
}
