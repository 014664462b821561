//! Voice - Speech voices, designs and previews

use serde::{Deserialize, Serialize};

/// A voice available on the speech service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
}

/// Brief used to design a brand-new voice from a text description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceDesignBrief {
    pub character: String,
    pub description: String,
    pub preview_text: String,
}

/// One candidate returned by voice design
#[derive(Debug, Clone, PartialEq)]
pub struct VoicePreview {
    pub generated_voice_id: String,
    /// Base64 audio exactly as returned by the service
    pub audio_base64: String,
}
