use crate::dsp::{
    delay::DelayLine,
    distortion::soft_clip,
    filter::OnePole,
    util::flush_denormal,
};

/*
Feedback Loop
=============

A delay line whose output is saturated, scaled and added back to the
input. Placed between the exciter and the resonators it smears the burst
into a short comb-filtered echo train; with the delay tracking the note
period it behaves like a plucked string feeding the body.

    x ───(+)──────────────────────────┬──► out (the written sample)
          ▲                           │
          │                           ▼
          └── g × soft_clip(hp(·)) ◄── delay

Stability
---------

  g      Hard limited to 0.95.
  clip   |soft_clip(v)| < 1 for any v, so the fed-back term is < 0.95 and
         |out| < |x| + 0.95 no matter how long the loop runs.
  hp     A 20 Hz one-pole highpass keeps a DC offset from circulating.

Buffer
------

Storage is sized to MAX_FEEDBACK_DELAY_MS at `prepare`. Changing the delay
time only moves the read position; it never reallocates.
*/

pub const MAX_FEEDBACK: f32 = 0.95;
pub const MAX_FEEDBACK_DELAY_MS: f32 = 500.0;
pub const MIN_DRIVE: f32 = 0.1;
pub const MAX_DRIVE: f32 = 10.0;
const DC_BLOCK_HZ: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct FeedbackLoop {
    line: DelayLine,
    delay_ms: f32,
    delay_samples: usize,
    feedback: f32,
    drive: f32,
    dc_block: OnePole,
    sample_rate: f32,
}

impl Default for FeedbackLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackLoop {
    pub fn new() -> Self {
        Self {
            line: DelayLine::new(),
            delay_ms: 5.0,
            delay_samples: 1,
            feedback: 0.0,
            drive: 1.0,
            dc_block: OnePole::highpass(DC_BLOCK_HZ),
            sample_rate: 0.0,
        }
    }

    /// Allocate the delay buffer for `sample_rate`. Not realtime-safe.
    pub fn prepare(&mut self, sample_rate: f32) {
        let capacity = (MAX_FEEDBACK_DELAY_MS * sample_rate / 1000.0).ceil() as usize + 2;
        self.line.allocate(capacity);
        self.dc_block.prepare(sample_rate);
        self.dc_block.reset();
        self.set_delay_time(self.delay_ms, sample_rate);
    }

    /// Delay in milliseconds, rounded to whole samples and clamped to the buffer.
    pub fn set_delay_time(&mut self, ms: f32, sample_rate: f32) {
        self.delay_ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
        self.sample_rate = sample_rate;

        let max_delay = self.line.capacity().saturating_sub(1).max(1);
        let samples = (self.delay_ms * sample_rate / 1000.0).round();
        self.delay_samples = if samples.is_finite() {
            (samples as usize).clamp(1, max_delay)
        } else {
            1
        };
    }

    pub fn set_feedback_amount(&mut self, amount: f32) {
        self.feedback = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, MAX_FEEDBACK)
        };
    }

    pub fn set_saturation_drive(&mut self, drive: f32) {
        self.drive = if drive.is_nan() {
            1.0
        } else {
            drive.clamp(MIN_DRIVE, MAX_DRIVE)
        };
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let delayed = self.line.read(self.delay_samples);
        let blocked = self.dc_block.process(delayed);
        let written = flush_denormal(x + self.feedback * soft_clip(blocked, self.drive));
        self.line.write(written);
        written
    }

    pub fn reset(&mut self) {
        self.line.reset();
        self.dc_block.reset();
    }

    pub fn feedback_amount(&self) -> f32 {
        self.feedback
    }

    pub fn saturation_drive(&self) -> f32 {
        self.drive
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Longest delay the buffer can hold, in samples.
    pub fn max_delay_samples(&self) -> usize {
        self.line.capacity().saturating_sub(1)
    }
}
