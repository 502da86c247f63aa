//! Saturation for the feedback path.
//!
//! A waveshaper applies a transfer function to each sample:
//!   output = f(input * drive)
//!
//! When drive is low the signal stays in the near-linear part of f() and
//! passes through almost unchanged. Pushing drive up moves it into the
//! curved region, which both adds harmonics and caps the level.
//!
//! Soft clip:
//!   f(x) = x / (1 + |x|)
//!
//! |f(x)| < 1 for every finite input. Inside a feedback loop that matters
//! more than the tone: whatever circulates is limited before it is scaled
//! by the feedback gain, so the loop cannot run away.
//!
//! # Drive Values
//!
//!   0.1  = Nearly linear (at loop levels)
//!   1.0  = Gentle compression of peaks
//!   2-4  = Warm saturation
//!   5-10 = Obvious distortion

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_signals_pass_nearly_unchanged() {
        // f(0.1) = 0.1 / 1.1 ≈ 0.0909
        let output = soft_clip(0.1, 1.0);
        assert!((output - 0.0909).abs() < 0.01);
    }

    #[test]
    fn high_drive_approaches_unity() {
        // f(10) = 10 / 11 ≈ 0.909
        let output = soft_clip(1.0, 10.0);
        assert!(output > 0.9 && output < 1.0);
    }

    #[test]
    fn output_is_bounded_and_odd() {
        for &x in &[-1.0e6, -3.0, -0.2, 0.0, 0.2, 3.0, 1.0e6] {
            let y = soft_clip(x, 10.0);
            assert!(y.abs() < 1.0 || (y.abs() - 1.0).abs() < 1.0e-6);
            assert_eq!(y, -soft_clip(-x, 10.0));
        }
    }
}
