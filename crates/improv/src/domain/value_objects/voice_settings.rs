//! VoiceSettings - Speech expressiveness parameters

use serde::{Deserialize, Serialize};

use crate::domain::errors::PipelineError;

pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";

/// Voice settings sent with every synthesis request
///
/// Lower stability gives a more varied, expressive read; higher style
/// widens the emotional range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
}

impl VoiceSettings {
    pub fn new(stability: f32, similarity_boost: f32, style: f32) -> Self {
        Self {
            stability,
            similarity_boost,
            style,
        }
    }

    pub fn apply(&self, overrides: &VoiceSettingsOverride) -> Self {
        Self {
            stability: overrides.stability.unwrap_or(self.stability),
            similarity_boost: overrides.similarity_boost.unwrap_or(self.similarity_boost),
            style: overrides.style.unwrap_or(self.style),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::Validation(format!(
                    "{name} {value} out of range [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::new(0.5, 0.75, 0.0)
    }
}

/// Partial voice settings for a one-off read
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceSettingsOverride {
    #[serde(default)]
    pub stability: Option<f32>,
    #[serde(default, alias = "similarity")]
    pub similarity_boost: Option<f32>,
    #[serde(default)]
    pub style: Option<f32>,
}

impl VoiceSettingsOverride {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
