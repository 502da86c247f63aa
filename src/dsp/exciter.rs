use crate::dsp::{envelope::Envelope, filter::OnePole, noise::NoiseSource};

/*
Exciter
=======

Something has to set the modes ringing. In a real instrument that is a
mallet, a pick, a bow; here it is a short burst of filtered noise.

    noise ──► one-pole LP (color) ──► × envelope ──► × velocity ──► out

  color      Lowpass cutoff in Hz. A dark exciter (a few hundred Hz) only
             wakes the low modes, a bright one (several kHz) excites the
             whole bank and sounds harder.

  envelope   Linear ADSR. With sustain at zero the exciter is a one-shot
             burst; with sustain above zero it keeps driving the body while
             the key is held.

  velocity   Peak amplitude. The noise sequence restarts on every note-on,
             so two notes struck with the same velocity and color excite
             the body identically, and a harder strike always carries
             more energy.
*/

pub const DEFAULT_COLOR_HZ: f32 = 4_000.0;

#[derive(Debug, Clone)]
pub struct Exciter {
    envelope: Envelope,
    noise: NoiseSource,
    color: OnePole,
    velocity: f32,
}

impl Default for Exciter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exciter {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(),
            noise: NoiseSource::default(),
            color: OnePole::lowpass(DEFAULT_COLOR_HZ),
            velocity: 0.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.envelope.prepare(sample_rate);
        self.color.prepare(sample_rate);
    }

    /// Start a new excitation. `velocity` is clamped to [0, 1].
    pub fn note_on(&mut self, velocity: f32) {
        self.velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };
        self.noise.restart();
        self.color.reset();
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    /// Release with the release time multiplied by `scale`.
    pub fn note_off_scaled(&mut self, scale: f32) {
        self.envelope.note_off_scaled(scale);
    }

    pub fn set_color(&mut self, cutoff_hz: f32) {
        self.color.set_cutoff(cutoff_hz);
    }

    pub fn set_attack_ms(&mut self, ms: f32) {
        self.envelope.set_attack(ms / 1000.0);
    }

    pub fn set_decay_ms(&mut self, ms: f32) {
        self.envelope.set_decay(ms / 1000.0);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.envelope.set_sustain(level);
    }

    pub fn set_release_ms(&mut self, ms: f32) {
        self.envelope.set_release(ms / 1000.0);
    }

    #[inline]
    pub fn process_sample(&mut self) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }

        let level = self.envelope.next_sample();
        let colored = self.color.process(self.noise.next_sample());
        colored * level * self.velocity
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Current envelope level, before velocity.
    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn reset(&mut self) {
        self.envelope.reset();
        self.color.reset();
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeState;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn exciter() -> Exciter {
        let mut exciter = Exciter::new();
        exciter.prepare(SAMPLE_RATE);
        exciter
    }

    fn energy(buffer: &[f32]) -> f32 {
        buffer.iter().map(|x| x * x).sum()
    }

    #[test]
    fn attack_never_dips() {
        let mut exciter = exciter();
        exciter.set_attack_ms(10.0);
        exciter.note_on(1.0);

        let mut previous = 0.0;
        let mut steps = 0;
        while exciter.envelope.state() == EnvelopeState::Attack && steps < 1_000 {
            exciter.process_sample();
            let level = exciter.level();
            assert!(level >= previous);
            previous = level;
            steps += 1;
        }
        assert!(previous > 0.99, "attack should reach full level, got {previous}");
    }

    #[test]
    fn silent_once_released() {
        let mut exciter = exciter();
        exciter.set_sustain(0.8);
        exciter.set_release_ms(20.0);
        exciter.note_on(1.0);

        let mut buffer = vec![0.0; 2_400];
        exciter.render(&mut buffer);
        assert!(energy(&buffer) > 0.0);

        exciter.note_off();
        let mut release = vec![0.0; 1_200];
        exciter.render(&mut release);

        let mut after = vec![0.0; 480];
        exciter.render(&mut after);
        assert!(!exciter.is_active());
        assert!(after.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn harder_strikes_carry_more_energy() {
        let mut previous = 0.0;
        for velocity in [0.1, 0.25, 0.5, 0.75, 1.0] {
            let mut exciter = exciter();
            exciter.note_on(velocity);
            let mut buffer = vec![0.0; 4_800];
            exciter.render(&mut buffer);

            let e = energy(&buffer);
            assert!(e > previous, "velocity {velocity} gave {e}, not above {previous}");
            previous = e;
        }
    }

    #[test]
    fn equal_settings_give_identical_bursts() {
        let mut exciter = exciter();
        exciter.note_on(0.7);
        let mut first = vec![0.0; 1_024];
        exciter.render(&mut first);

        exciter.note_on(0.7);
        let mut second = vec![0.0; 1_024];
        exciter.render(&mut second);

        assert_eq!(first, second);
    }

    #[test]
    fn brighter_color_has_more_high_frequency_energy() {
        let high_frequency_energy = |color: f32| {
            let mut exciter = exciter();
            exciter.set_sustain(1.0);
            exciter.set_color(color);
            exciter.note_on(1.0);
            let mut buffer = vec![0.0; 4_800];
            exciter.render(&mut buffer);
            // First difference emphasises the top of the spectrum.
            buffer.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum::<f32>()
        };

        assert!(high_frequency_energy(12_000.0) > 2.0 * high_frequency_energy(500.0));
    }

    #[test]
    fn zero_velocity_is_silent() {
        let mut exciter = exciter();
        exciter.note_on(0.0);
        let mut buffer = vec![0.0; 512];
        exciter.render(&mut buffer);
        assert_eq!(energy(&buffer), 0.0);
    }
}
