//! Production Catalog
//!
//! Everything an episode needs that is not generated: the shared style
//! guide, the cast roster, the shot list, the script and the voice
//! casting. An embedded copy ships with the binary; a project can supply
//! its own file instead.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use improv::{
    CharacterTemplate, DialogueLine, PipelineError, ShotSpec, VoiceDesignBrief, VoiceSettings,
    DEFAULT_NEGATIVE_PROMPT, SHOT_NEGATIVE_PROMPT,
};

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.toml");

/// Shared prompt fragments applied to every character
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleGuide {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub quality: String,
    /// Camera framing for episode shots
    #[serde(default)]
    pub framing: String,
    #[serde(default = "default_negative")]
    pub negative: String,
    #[serde(default = "default_shot_negative")]
    pub shot_negative: String,
}

fn default_negative() -> String {
    DEFAULT_NEGATIVE_PROMPT.to_string()
}

fn default_shot_negative() -> String {
    SHOT_NEGATIVE_PROMPT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Episode {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A test line read by several candidate voices
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Audition {
    pub line: String,
    #[serde(default)]
    pub voices: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DesignEntry {
    description: String,
    preview_text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    style: StyleGuide,
    episode: Episode,
    #[serde(default)]
    characters: BTreeMap<String, CharacterTemplate>,
    #[serde(default)]
    shots: Vec<ShotSpec>,
    #[serde(default)]
    lines: Vec<DialogueLine>,
    #[serde(default)]
    voices: BTreeMap<String, String>,
    #[serde(default)]
    voice_profiles: BTreeMap<String, VoiceSettings>,
    #[serde(default)]
    voice_designs: BTreeMap<String, DesignEntry>,
    #[serde(default)]
    auditions: BTreeMap<String, Audition>,
}

/// Parsed and cross-checked production catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    style: StyleGuide,
    episode: Episode,
    characters: BTreeMap<String, CharacterTemplate>,
    shots: Vec<ShotSpec>,
    lines: Vec<DialogueLine>,
    voices: BTreeMap<String, String>,
    voice_profiles: BTreeMap<String, VoiceSettings>,
    voice_designs: BTreeMap<String, DesignEntry>,
    auditions: BTreeMap<String, Audition>,
}

impl Catalog {
    /// The catalog compiled into the crate
    pub fn embedded() -> Result<Self, PipelineError> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub async fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PipelineError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| PipelineError::Serialization(format!("catalog: {e}")))?;

        let characters = file
            .characters
            .into_iter()
            .map(|(id, mut template)| {
                template.id = id.clone();
                let template = template.with_style_defaults(&file.style.base, &file.style.quality);
                (id, template)
            })
            .collect();

        let catalog = Self {
            style: file.style,
            episode: file.episode,
            characters,
            shots: file.shots,
            lines: file.lines,
            voices: file.voices,
            voice_profiles: file.voice_profiles,
            voice_designs: file.voice_designs,
            auditions: file.auditions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every shot and line must reference a known character and profile
    fn validate(&self) -> Result<(), PipelineError> {
        for shot in &self.shots {
            if !self.characters.contains_key(&shot.character) {
                return Err(PipelineError::Validation(format!(
                    "shot '{}' references unknown character '{}'",
                    shot.id, shot.character
                )));
            }
        }
        for line in &self.lines {
            if !self.characters.contains_key(&line.character) {
                return Err(PipelineError::Validation(format!(
                    "line '{}' references unknown character '{}'",
                    line.id, line.character
                )));
            }
            if let Some(profile) = &line.voice_profile {
                if !self.voice_profiles.contains_key(profile) {
                    return Err(PipelineError::Validation(format!(
                        "line '{}' references unknown voice profile '{}'",
                        line.id, profile
                    )));
                }
            }
        }
        for settings in self.voice_profiles.values() {
            settings.validate()?;
        }
        Ok(())
    }

    pub fn style(&self) -> &StyleGuide {
        &self.style
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Roster templates with the style guide filled in
    pub fn characters(&self) -> Vec<CharacterTemplate> {
        self.characters.values().cloned().collect()
    }

    pub fn shots(&self) -> &[ShotSpec] {
        &self.shots
    }

    pub fn shot(&self, id: &str) -> Result<&ShotSpec, PipelineError> {
        self.shots
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| PipelineError::not_found("shot", id, self.shots.iter().map(|s| s.id.clone())))
    }

    pub fn lines(&self) -> &[DialogueLine] {
        &self.lines
    }

    pub fn line(&self, id: &str) -> Result<&DialogueLine, PipelineError> {
        self.lines
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| PipelineError::not_found("line", id, self.lines.iter().map(|l| l.id.clone())))
    }

    pub fn voice_id(&self, character: &str) -> Result<&str, PipelineError> {
        self.voices
            .get(character)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::not_found("voice", character, self.voices.keys().cloned()))
    }

    /// Named profile, or the service defaults when none is defined
    pub fn voice_settings(&self, key: &str) -> VoiceSettings {
        match self.voice_profiles.get(key) {
            Some(settings) => *settings,
            None => {
                tracing::debug!(profile = key, "No voice profile, using defaults");
                VoiceSettings::default()
            }
        }
    }

    pub fn design_brief(&self, character: &str) -> Result<VoiceDesignBrief, PipelineError> {
        self.voice_designs
            .get(character)
            .map(|d| VoiceDesignBrief {
                character: character.to_string(),
                description: d.description.clone(),
                preview_text: d.preview_text.clone(),
            })
            .ok_or_else(|| {
                PipelineError::not_found("voice design", character, self.voice_designs.keys().cloned())
            })
    }

    pub fn design_characters(&self) -> Vec<String> {
        self.voice_designs.keys().cloned().collect()
    }

    pub fn audition(&self, character: &str) -> Option<&Audition> {
        self.auditions.get(character)
    }
}
