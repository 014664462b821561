//! ImageSettings - Diffusion sampling parameters

use serde::{Deserialize, Serialize};

use crate::domain::errors::PipelineError;

pub const DEFAULT_SAMPLER: &str = "DPM++ 2M Karras";
pub const DEFAULT_MODEL: &str = "juggernautXL_ragnarokBy.safetensors";

/// Samplers offered by the WebUI that the pipeline has been tuned against.
pub const KNOWN_SAMPLERS: &[&str] = &[
    "DPM++ 2M Karras",
    "DPM++ SDE Karras",
    "DPM++ 2M SDE Karras",
    "Euler a",
    "DDIM",
];

/// Image generation settings
///
/// Immutable per call. Build one from a preset and layer an
/// [`ImageSettingsOverride`] on top with [`ImageSettings::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Checkpoint the WebUI should have loaded (`None` = whatever is loaded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub sampler_name: String,
    pub steps: u32,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub batch_size: u32,
    /// img2img only: 0 keeps the reference unchanged, 1 ignores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoising_strength: Option<f32>,
}

impl ImageSettings {
    /// Character asset preset (portrait, four candidates)
    pub fn asset() -> Self {
        Self {
            model: Some(DEFAULT_MODEL.to_string()),
            sampler_name: DEFAULT_SAMPLER.to_string(),
            steps: 20,
            cfg_scale: 7.0,
            width: 896,
            height: 1152,
            batch_size: 4,
            denoising_strength: Some(0.5),
        }
    }

    /// Medium-shot preset for animation plates (square, three candidates)
    pub fn shot() -> Self {
        Self {
            model: None,
            sampler_name: DEFAULT_SAMPLER.to_string(),
            steps: 25,
            cfg_scale: 7.0,
            width: 1024,
            height: 1024,
            batch_size: 3,
            denoising_strength: None,
        }
    }

    /// Return a copy with every field set in `overrides` replaced
    pub fn apply(&self, overrides: &ImageSettingsOverride) -> Self {
        Self {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            sampler_name: overrides
                .sampler_name
                .clone()
                .unwrap_or_else(|| self.sampler_name.clone()),
            steps: overrides.steps.unwrap_or(self.steps),
            cfg_scale: overrides.cfg_scale.unwrap_or(self.cfg_scale),
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            batch_size: overrides.batch_size.unwrap_or(self.batch_size),
            denoising_strength: overrides.denoising_strength.or(self.denoising_strength),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sampler_name.trim().is_empty() {
            return Err(PipelineError::Validation("sampler_name is empty".into()));
        }
        if self.steps == 0 {
            return Err(PipelineError::Validation("steps must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::Validation(
                "batch_size must be at least 1".into(),
            ));
        }
        if self.width == 0 || self.height == 0 || self.width % 8 != 0 || self.height % 8 != 0 {
            return Err(PipelineError::Validation(format!(
                "size {}x{} must be non-zero multiples of 8",
                self.width, self.height
            )));
        }
        if !(self.cfg_scale > 0.0 && self.cfg_scale <= 30.0) {
            return Err(PipelineError::Validation(format!(
                "cfg_scale {} out of range (0, 30]",
                self.cfg_scale
            )));
        }
        if let Some(strength) = self.denoising_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(PipelineError::Validation(format!(
                    "denoising_strength {} out of range [0, 1]",
                    strength
                )));
            }
        }
        Ok(())
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self::asset()
    }
}

/// Partial image settings supplied by a caller or a character template
///
/// Unknown keys are rejected so a misspelt setting never silently falls
/// back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSettingsOverride {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "sampler")]
    pub sampler_name: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub cfg_scale: Option<f32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub denoising_strength: Option<f32>,
}

impl ImageSettingsOverride {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            model: other.model.clone().or_else(|| self.model.clone()),
            sampler_name: other
                .sampler_name
                .clone()
                .or_else(|| self.sampler_name.clone()),
            steps: other.steps.or(self.steps),
            cfg_scale: other.cfg_scale.or(self.cfg_scale),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            batch_size: other.batch_size.or(self.batch_size),
            denoising_strength: other.denoising_strength.or(self.denoising_strength),
        }
    }
}
