//! Small numeric helpers shared by the realtime primitives.

/// Values below this magnitude are treated as silence in filter state.
pub const DENORMAL_THRESHOLD: f32 = 1.0e-20;

/// Flush denormals and non-finite values to zero.
///
/// Recursive filters that ring down towards zero spend a long time in the
/// subnormal range, where some CPUs slow down by orders of magnitude.
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if !x.is_finite() || x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}

/// Peak absolute value of a buffer.
#[inline]
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
