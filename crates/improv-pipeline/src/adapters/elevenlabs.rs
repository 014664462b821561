//! ElevenLabs Client
//!
//! Implements [`SpeechSynthesizer`] against the ElevenLabs v1 REST API:
//! text-to-speech, voice listing and voice design previews.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use improv::{
    PipelineError, SpeechRequest, SpeechSynthesizer, VoiceDesignBrief, VoiceInfo, VoicePreview,
    VoiceSettings,
};

use super::http::{ensure_success, map_transport_error, trim_base_url};

const SERVICE: &str = "speech service";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Configuration for the ElevenLabs client
#[derive(Clone)]
pub struct ElevenLabsConfig {
    api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    /// Fails with `Configuration` when the key is blank
    pub fn new(api_key: impl Into<String>) -> Result<Self, PipelineError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "{API_KEY_ENV} is not set"
            )));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(&base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// ElevenLabs API client
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(concat!("improv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url, path)
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> PipelineError {
        map_transport_error(SERVICE, operation, self.config.timeout, err)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, PipelineError> {
        let url = self.url(&format!(
            "text-to-speech/{}?output_format={}",
            urlencoding::encode(&request.voice_id),
            OUTPUT_FORMAT
        ));
        let body = TextToSpeechRequest {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: request.settings.into(),
        };

        tracing::debug!(
            voice_id = %request.voice_id,
            model_id = %request.model_id,
            chars = request.text.chars().count(),
            "Requesting speech"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error("text-to-speech", e))?;

        let mut response = ensure_success(response).await?;

        let mut audio = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error("text-to-speech", e))?
        {
            audio.extend_from_slice(&chunk);
        }

        if audio.is_empty() {
            return Err(PipelineError::invalid_response(SERVICE, "empty audio stream"));
        }
        Ok(audio)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, PipelineError> {
        let response = self
            .client
            .get(self.url("voices"))
            .header("xi-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error("voices", e))?;

        let voices: VoicesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| self.transport_error("voices", e))?;

        Ok(voices.voices)
    }

    async fn design_voice(
        &self,
        brief: &VoiceDesignBrief,
    ) -> Result<Vec<VoicePreview>, PipelineError> {
        let body = DesignRequest {
            voice_description: brief.description.trim(),
            text: brief.preview_text.trim(),
        };

        let response = self
            .client
            .post(self.url("text-to-voice/create-previews"))
            .header("xi-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error("voice design", e))?;

        let designed: DesignResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| self.transport_error("voice design", e))?;

        Ok(designed.into_previews())
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: WireVoiceSettings,
}

#[derive(Serialize)]
struct WireVoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
}

impl From<VoiceSettings> for WireVoiceSettings {
    fn from(s: VoiceSettings) -> Self {
        Self {
            stability: s.stability,
            similarity_boost: s.similarity_boost,
            style: s.style,
        }
    }
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceInfo>,
}

#[derive(Serialize)]
struct DesignRequest<'a> {
    voice_description: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct DesignResponse {
    #[serde(default)]
    previews: Vec<DesignPreview>,
}

#[derive(Deserialize)]
struct DesignPreview {
    audio_base_64: String,
    generated_voice_id: String,
}

impl DesignResponse {
    fn into_previews(self) -> Vec<VoicePreview> {
        self.previews
            .into_iter()
            .map(|p| VoicePreview {
                generated_voice_id: p.generated_voice_id,
                audio_base64: p.audio_base_64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_configuration_error() {
        assert!(matches!(
            ElevenLabsConfig::new("  "),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ElevenLabsConfig::new("sk-secret").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_tts_body_shape() {
        let body = TextToSpeechRequest {
            text: "Internet Improv presents...",
            model_id: "eleven_multilingual_v2",
            voice_settings: VoiceSettings::new(0.15, 0.6, 1.0).into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert_eq!(json["voice_settings"]["style"], 1.0);
        assert!(json["voice_settings"]["stability"].as_f64().unwrap() < 0.2);
    }

    #[test]
    fn test_parse_design_response() {
        let designed: DesignResponse = serde_json::from_str(
            r#"{"previews": [
                {"audio_base_64": "aGk=", "generated_voice_id": "gen-1", "media_type": "audio/mpeg", "duration_secs": 4.2},
                {"audio_base_64": "aGk=", "generated_voice_id": "gen-2"}
            ], "text": "preview"}"#,
        )
        .unwrap();
        let previews = designed.into_previews();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[1].generated_voice_id, "gen-2");
    }

    #[test]
    fn test_parse_voices_response() {
        let voices: VoicesResponse = serde_json::from_str(
            r#"{"voices": [{"voice_id": "ErXwobaYiN019PkySvjV", "name": "Antoni", "category": "premade"}]}"#,
        )
        .unwrap();
        assert_eq!(voices.voices[0].name, "Antoni");
    }
}
