pub mod config;
pub mod dsp; // Modal filters, exciter, feedback loop
pub mod error;
pub mod io; // MIDI adapter
pub mod patch; // Presets
pub mod synth; // Voice management and polyphony

pub use config::EngineConfig;
pub use error::EngineError;
pub use synth::{ModalSynth, NoteEvent, ParamId, VoiceParams};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_POLYPHONY: usize = 64;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
