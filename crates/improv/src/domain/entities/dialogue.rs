//! DialogueLine - One voiced line of an episode script

use serde::{Deserialize, Serialize};

/// Dialogue line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub id: String,
    pub character: String,
    pub text: String,
    /// Named voice-settings profile used instead of the character default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_profile: Option<String>,
}

impl DialogueLine {
    /// Key of the voice-settings profile this line reads with
    pub fn settings_key(&self) -> &str {
        self.voice_profile.as_deref().unwrap_or(&self.character)
    }
}
