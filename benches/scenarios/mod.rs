//! Real-world scenario benchmarks.
//!
//! Complete voices and the full engine under typical and worst-case load.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
