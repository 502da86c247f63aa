use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Default seed; every note-on restarts the sequence from here.
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_CAFE_F00D_0001;

/// White noise in [-1, 1).
///
/// `SmallRng` keeps all of its state inline, so generating samples never
/// allocates and the source can live inside a voice. Reseeding on every
/// note makes bursts repeatable: the same velocity and color always strike
/// the body the same way.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: SmallRng,
    seed: u64,
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Restart the sequence from the configured seed.
    pub fn restart(&mut self) {
        self.rng = SmallRng::seed_from_u64(self.seed);
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.random_range(-1.0f32..1.0)
    }
}
