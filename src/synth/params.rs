use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::resonator::MAX_MODES, error::EngineError};

/// Every parameter the engine understands.
///
/// The string ids are stable: hosts and presets address parameters by id,
/// never by position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    ModeCount,
    HarmonicModes,
    DecayMs,
    DecayTilt,
    ModeRolloff,
    ExciterAttackMs,
    ExciterDecayMs,
    ExciterSustain,
    ExciterReleaseMs,
    ExciterColor,
    FeedbackAmount,
    FeedbackDelayMs,
    FeedbackTracking,
    SaturationDrive,
    OutputGain,
    StereoWidth,
}

impl ParamId {
    pub const ALL: [ParamId; 16] = [
        ParamId::ModeCount,
        ParamId::HarmonicModes,
        ParamId::DecayMs,
        ParamId::DecayTilt,
        ParamId::ModeRolloff,
        ParamId::ExciterAttackMs,
        ParamId::ExciterDecayMs,
        ParamId::ExciterSustain,
        ParamId::ExciterReleaseMs,
        ParamId::ExciterColor,
        ParamId::FeedbackAmount,
        ParamId::FeedbackDelayMs,
        ParamId::FeedbackTracking,
        ParamId::SaturationDrive,
        ParamId::OutputGain,
        ParamId::StereoWidth,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ParamId::ModeCount => "modeCount",
            ParamId::HarmonicModes => "harmonicModes",
            ParamId::DecayMs => "decayMs",
            ParamId::DecayTilt => "decayTilt",
            ParamId::ModeRolloff => "modeRolloff",
            ParamId::ExciterAttackMs => "exciterAttackMs",
            ParamId::ExciterDecayMs => "exciterDecayMs",
            ParamId::ExciterSustain => "exciterSustain",
            ParamId::ExciterReleaseMs => "exciterReleaseMs",
            ParamId::ExciterColor => "exciterColor",
            ParamId::FeedbackAmount => "feedbackAmount",
            ParamId::FeedbackDelayMs => "feedbackDelayMs",
            ParamId::FeedbackTracking => "feedbackTracking",
            ParamId::SaturationDrive => "saturationDrive",
            ParamId::OutputGain => "outputGain",
            ParamId::StereoWidth => "stereoWidth",
        }
    }

    /// Look up an id without allocating. Used on the audio thread.
    pub fn from_id(id: &str) -> Option<ParamId> {
        ParamId::ALL.iter().copied().find(|param| param.id() == id)
    }

    /// Inclusive (min, max).
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::ModeCount => (1.0, MAX_MODES as f32),
            ParamId::HarmonicModes => (0.0, MAX_MODES as f32),
            ParamId::DecayMs => (1.0, 60_000.0),
            ParamId::DecayTilt => (0.0, 2.0),
            ParamId::ModeRolloff => (0.0, 2.0),
            ParamId::ExciterAttackMs => (0.05, 2_000.0),
            ParamId::ExciterDecayMs => (0.05, 5_000.0),
            ParamId::ExciterSustain => (0.0, 1.0),
            ParamId::ExciterReleaseMs => (0.05, 5_000.0),
            ParamId::ExciterColor => (20.0, 20_000.0),
            ParamId::FeedbackAmount => (0.0, 0.95),
            ParamId::FeedbackDelayMs => (0.05, 500.0),
            ParamId::FeedbackTracking => (0.0, 1.0),
            ParamId::SaturationDrive => (0.1, 10.0),
            ParamId::OutputGain => (0.0, 2.0),
            ParamId::StereoWidth => (0.0, 1.0),
        }
    }

    pub fn default_value(self) -> f32 {
        VoiceParams::default().get(self)
    }

    /// Clamp into range. NaN maps to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

impl FromStr for ParamId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::from_id(s).ok_or_else(|| EngineError::UnknownParameter(s.to_string()))
    }
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Voice-level settings shared by every voice in the pool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub mode_count: usize,
    pub harmonic_modes: usize,
    pub decay_ms: f32,
    pub decay_tilt: f32,
    pub mode_rolloff: f32,
    pub exciter_attack_ms: f32,
    pub exciter_decay_ms: f32,
    pub exciter_sustain: f32,
    pub exciter_release_ms: f32,
    pub exciter_color: f32,
    pub feedback_amount: f32,
    pub feedback_delay_ms: f32,
    /// Delay follows the note period instead of `feedback_delay_ms`.
    pub feedback_tracking: bool,
    pub saturation_drive: f32,
    pub output_gain: f32,
    pub stereo_width: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            mode_count: MAX_MODES,
            harmonic_modes: MAX_MODES / 2,
            decay_ms: 1_200.0,
            decay_tilt: 0.5,
            mode_rolloff: 0.5,
            exciter_attack_ms: 1.0,
            exciter_decay_ms: 25.0,
            exciter_sustain: 0.0,
            exciter_release_ms: 40.0,
            exciter_color: 4_000.0,
            feedback_amount: 0.3,
            feedback_delay_ms: 5.0,
            feedback_tracking: false,
            saturation_drive: 1.0,
            output_gain: 0.8,
            stereo_width: 0.5,
        }
    }
}

impl VoiceParams {
    /// Store `value`, clamped into the parameter's range.
    pub fn set(&mut self, param: ParamId, value: f32) {
        let value = param.clamp(value);
        match param {
            ParamId::ModeCount => self.mode_count = value.round() as usize,
            ParamId::HarmonicModes => self.harmonic_modes = value.round() as usize,
            ParamId::DecayMs => self.decay_ms = value,
            ParamId::DecayTilt => self.decay_tilt = value,
            ParamId::ModeRolloff => self.mode_rolloff = value,
            ParamId::ExciterAttackMs => self.exciter_attack_ms = value,
            ParamId::ExciterDecayMs => self.exciter_decay_ms = value,
            ParamId::ExciterSustain => self.exciter_sustain = value,
            ParamId::ExciterReleaseMs => self.exciter_release_ms = value,
            ParamId::ExciterColor => self.exciter_color = value,
            ParamId::FeedbackAmount => self.feedback_amount = value,
            ParamId::FeedbackDelayMs => self.feedback_delay_ms = value,
            ParamId::FeedbackTracking => self.feedback_tracking = value >= 0.5,
            ParamId::SaturationDrive => self.saturation_drive = value,
            ParamId::OutputGain => self.output_gain = value,
            ParamId::StereoWidth => self.stereo_width = value,
        }
    }

    pub fn get(&self, param: ParamId) -> f32 {
        match param {
            ParamId::ModeCount => self.mode_count as f32,
            ParamId::HarmonicModes => self.harmonic_modes as f32,
            ParamId::DecayMs => self.decay_ms,
            ParamId::DecayTilt => self.decay_tilt,
            ParamId::ModeRolloff => self.mode_rolloff,
            ParamId::ExciterAttackMs => self.exciter_attack_ms,
            ParamId::ExciterDecayMs => self.exciter_decay_ms,
            ParamId::ExciterSustain => self.exciter_sustain,
            ParamId::ExciterReleaseMs => self.exciter_release_ms,
            ParamId::ExciterColor => self.exciter_color,
            ParamId::FeedbackAmount => self.feedback_amount,
            ParamId::FeedbackDelayMs => self.feedback_delay_ms,
            ParamId::FeedbackTracking => {
                if self.feedback_tracking {
                    1.0
                } else {
                    0.0
                }
            }
            ParamId::SaturationDrive => self.saturation_drive,
            ParamId::OutputGain => self.output_gain,
            ParamId::StereoWidth => self.stereo_width,
        }
    }
}
