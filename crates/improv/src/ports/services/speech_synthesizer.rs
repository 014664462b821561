//! Speech Synthesizer Port
//!
//! Abstract interface for a text-to-speech provider.

use async_trait::async_trait;

use crate::domain::{errors::PipelineError, SpeechRequest, VoiceDesignBrief, VoiceInfo, VoicePreview};

/// Speech service
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `request.text` and collect the whole audio stream
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, PipelineError>;

    /// Voices available to this account
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, PipelineError>;

    /// Design candidate voices from a text description
    async fn design_voice(&self, brief: &VoiceDesignBrief)
        -> Result<Vec<VoicePreview>, PipelineError>;
}
