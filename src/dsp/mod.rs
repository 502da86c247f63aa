//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free once prepared and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; note handling and mixing live in `synth`.

/// Circular delay buffer sized at prepare time.
pub mod delay;
/// Soft-clip waveshaper for the feedback path.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Noise burst shaped by an envelope and a color filter.
pub mod exciter;
/// Delay-line feedback loop with saturation and DC blocking.
pub mod feedback;
/// One-pole TPT filter with lowpass and highpass outputs.
pub mod filter;
/// Two-pole resonant mode.
pub mod modal;
pub mod noise;
/// Bank of modes forming one timbre.
pub mod resonator;
pub mod smooth;
pub mod util;

pub use envelope::EnvelopeState;
pub use exciter::Exciter;
pub use feedback::FeedbackLoop;
pub use modal::{ModalCoefficients, ModalFilter};
pub use resonator::{ModeKind, ResonatorBank};
