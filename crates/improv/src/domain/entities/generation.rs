//! Generation - Requests to and results from the generation services

use serde::{Deserialize, Serialize};

use super::Payload;
use crate::domain::value_objects::{ImageSettings, Seed, VoiceSettings};

/// Image request, identical for txt2img and img2img
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub settings: ImageSettings,
    pub seed: Seed,
}

/// Images plus what the service reported about them
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub images: Vec<Payload>,
    /// Seed the service actually used, when it reported one
    pub seed: Option<i64>,
    /// Raw `info` document (sampler, all_seeds, ...)
    pub info: serde_json::Value,
}

impl ImageResult {
    /// Seed to record: reported by the service, else the fixed one requested
    pub fn resolved_seed(&self, requested: Seed) -> Option<i64> {
        self.seed
            .or_else(|| (!requested.is_random()).then_some(requested.0))
    }
}

/// A checkpoint known to the image service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub title: String,
    pub model_name: String,
}

/// Text-to-speech request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub settings: VoiceSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(seed: Option<i64>) -> ImageResult {
        ImageResult {
            images: Vec::new(),
            seed,
            info: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_resolved_seed_prefers_service_value() {
        assert_eq!(result(Some(99)).resolved_seed(Seed(5)), Some(99));
        assert_eq!(result(None).resolved_seed(Seed(5)), Some(5));
        assert_eq!(result(None).resolved_seed(Seed::RANDOM), None);
    }
}
