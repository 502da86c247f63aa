/// Linear parameter ramp.
///
/// A new target is reached over a fixed number of samples at a constant
/// rate, so gain changes arriving once per block never step.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: usize,
    ramp_samples: usize,
}

impl SmoothedValue {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
            ramp_samples: 1,
        }
    }

    /// Ramp length in samples for subsequent targets.
    pub fn set_ramp_length(&mut self, samples: usize) {
        self.ramp_samples = samples.max(1);
    }

    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    /// Jump to `value` with no ramp.
    pub fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.remaining = 0;
        self.step = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_exactly_after_ramp() {
        let mut value = SmoothedValue::new(0.0);
        value.set_ramp_length(4);
        value.set_target(1.0);

        let ramp: Vec<f32> = (0..6).map(|_| value.next_sample()).collect();
        assert_eq!(ramp[3], 1.0);
        assert_eq!(ramp[5], 1.0);
        assert!(ramp.windows(2).all(|w| w[1] >= w[0]));
        assert!(!value.is_smoothing());
    }

    #[test]
    fn unchanged_target_holds_steady() {
        let mut value = SmoothedValue::new(0.5);
        value.set_ramp_length(8);
        value.set_target(0.5);
        assert!(!value.is_smoothing());
        assert!((0..8).all(|_| value.next_sample() == 0.5));
    }

    #[test]
    fn snap_skips_the_ramp() {
        let mut value = SmoothedValue::new(0.0);
        value.set_ramp_length(100);
        value.set_target(1.0);
        value.snap(0.25);
        assert_eq!(value.next_sample(), 0.25);
    }
}
