use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    synth::params::{ParamId, VoiceParams},
};

/// A named sound: parameter id → value plus descriptive metadata.
///
/// Presets never touch the filesystem; hosts own storage and hand the JSON
/// text in and out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preset {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Snapshot every parameter of `params`.
    pub fn capture(name: impl Into<String>, params: &VoiceParams) -> Self {
        let mut preset = Self::new(name);
        for param in ParamId::ALL {
            preset.params.insert(param.id().to_string(), params.get(param));
        }
        preset
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn set(&mut self, param: ParamId, value: f32) {
        self.params.insert(param.id().to_string(), value);
    }

    /// Resolve into voice settings. Missing ids keep their defaults; unknown
    /// ids and non-finite values are errors.
    pub fn to_params(&self) -> Result<VoiceParams, EngineError> {
        let mut params = VoiceParams::default();
        for (id, &value) in &self.params {
            let param = id.parse::<ParamId>().inspect_err(|_| {
                tracing::debug!(preset = %self.name, id = %id, "unknown parameter in preset");
            })?;
            if !value.is_finite() {
                tracing::debug!(preset = %self.name, id = %id, value, "non-finite preset value");
                return Err(EngineError::InvalidParameterValue {
                    param: param.id(),
                    value,
                });
            }
            params.set(param, value);
        }
        Ok(params)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::MalformedPreset(e.to_string()))
    }

    /// Parse and validate a preset.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let preset: Preset =
            serde_json::from_str(text).map_err(|e| EngineError::MalformedPreset(e.to_string()))?;
        preset.to_params()?;
        Ok(preset)
    }
}
