use thiserror::Error;

/// Errors reported at the engine's entry points.
///
/// Numerical hazards (tiny decay times, denormals, feedback at its ceiling)
/// are never reported here; they are clamped away inside the DSP code. Only
/// `UnknownParameter` and `MalformedPreset` own heap data, and both are built
/// on the control side, never inside `process`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size {requested} is outside 1..={max}")]
    InvalidBlockSize { requested: usize, max: usize },

    #[error("note {0} is outside the MIDI range 0..=127")]
    NoteOutOfRange(u8),

    #[error("velocity {0} is outside 0.0..=1.0")]
    VelocityOutOfRange(f32),

    #[error("unknown parameter id `{0}`")]
    UnknownParameter(String),

    #[error("parameter `{param}` rejected non-finite value {value}")]
    InvalidParameterValue { param: &'static str, value: f32 },

    #[error("event queue is full")]
    EventQueueFull,

    #[error("engine used before prepare()")]
    NotPrepared,

    #[error("malformed preset: {0}")]
    MalformedPreset(String),
}

impl EngineError {
    /// Short stable tag, handy for host-side reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidSampleRate(_) => "invalid_sample_rate",
            EngineError::InvalidBlockSize { .. } => "invalid_block_size",
            EngineError::NoteOutOfRange(_) => "note_out_of_range",
            EngineError::VelocityOutOfRange(_) => "velocity_out_of_range",
            EngineError::UnknownParameter(_) => "unknown_parameter",
            EngineError::InvalidParameterValue { .. } => "invalid_parameter_value",
            EngineError::EventQueueFull => "event_queue_full",
            EngineError::NotPrepared => "not_prepared",
            EngineError::MalformedPreset(_) => "malformed_preset",
        }
    }
}

/// Reject anything that is not a usable audio sample rate.
pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<(), EngineError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSampleRate(sample_rate))
    }
}

pub(crate) fn check_note(note: u8) -> Result<(), EngineError> {
    if note <= 127 {
        Ok(())
    } else {
        Err(EngineError::NoteOutOfRange(note))
    }
}

pub(crate) fn check_velocity(velocity: f32) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&velocity) {
        Ok(())
    } else {
        Err(EngineError::VelocityOutOfRange(velocity))
    }
}
