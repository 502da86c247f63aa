#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{check_sample_rate, EngineError},
    MAX_BLOCK_SIZE, MAX_POLYPHONY,
};

/// Static engine configuration, fixed between calls to `prepare`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_block_size: usize,
    /// Number of voices in the pool (clamped to 1..=MAX_POLYPHONY).
    pub polyphony: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: 512,
            polyphony: 16,
        }
    }
}

impl EngineConfig {
    pub fn with_polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = polyphony;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        check_sample_rate(self.sample_rate)?;
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::InvalidBlockSize {
                requested: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }

    pub(crate) fn voice_count(&self) -> usize {
        self.polyphony.clamp(1, MAX_POLYPHONY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_blocks_are_rejected() {
        let config = EngineConfig {
            max_block_size: MAX_BLOCK_SIZE + 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn polyphony_is_clamped() {
        assert_eq!(EngineConfig::default().with_polyphony(0).voice_count(), 1);
        assert_eq!(
            EngineConfig::default().with_polyphony(10_000).voice_count(),
            MAX_POLYPHONY
        );
    }
}
