//! Benchmarks for low-level DSP primitives.

mod envelope;
mod exciter;
mod feedback;
mod modal;
mod resonator;

pub use envelope::bench_envelope;
pub use exciter::bench_exciter;
pub use feedback::bench_feedback;
pub use modal::bench_modal;
pub use resonator::bench_resonator;
