/// Circular delay buffer.
///
/// Storage is allocated by [`DelayLine::allocate`], which belongs in
/// `prepare`; reading and writing never allocate. An unallocated line reads
/// silence and drops writes.
#[derive(Debug, Clone, Default)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to `capacity` samples and clear. Keeps the existing buffer when
    /// the size is unchanged.
    pub fn allocate(&mut self, capacity: usize) {
        let capacity = capacity.max(2);
        if self.buffer.len() == capacity {
            self.reset();
        } else {
            self.buffer = vec![0.0; capacity];
            self.write_pos = 0;
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The sample written `delay_samples` writes ago, clamped to the capacity.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let capacity = self.buffer.len();
        if capacity == 0 {
            return 0.0;
        }

        let delay_samples = delay_samples.clamp(1, capacity - 1);
        let read_pos = (self.write_pos + capacity - delay_samples) % capacity;
        self.buffer[read_pos]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        let capacity = self.buffer.len();
        if capacity == 0 {
            return;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % capacity;
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
