//! CharacterTemplate - Static description of a cast member
//!
//! Pure domain entity without infrastructure dependencies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ImageSettingsOverride;

/// Phrase used when an expression key is not defined for a character
pub const DEFAULT_EXPRESSION: &str = "neutral expression";
/// Phrase used when a pose key is not defined for a character
pub const DEFAULT_POSE: &str = "standing naturally";

/// Character template
///
/// Field names on disk follow the `pipeline/prompts/<id>.json` format
/// (`identity_tags`, `outfit_tags`, ...). Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    /// Lookup key; filled from the file stem when absent on disk
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub base_prompt: String,
    #[serde(rename = "identity_tags", alias = "identity")]
    pub identity: String,
    #[serde(rename = "outfit_tags", alias = "outfit", default)]
    pub outfit: String,
    #[serde(rename = "style_tags", alias = "style", default)]
    pub style: String,
    #[serde(default)]
    pub expressions: BTreeMap<String, String>,
    #[serde(default)]
    pub poses: BTreeMap<String, String>,
    #[serde(
        rename = "negative_prompt_default",
        alias = "negative_prompt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_settings: Option<ImageSettingsOverride>,
}

impl CharacterTemplate {
    /// Expression phrase for `key`, or [`DEFAULT_EXPRESSION`]
    pub fn expression(&self, key: &str) -> &str {
        self.expressions
            .get(key)
            .map(String::as_str)
            .unwrap_or(DEFAULT_EXPRESSION)
    }

    /// Pose phrase for `key`, or [`DEFAULT_POSE`]
    pub fn pose(&self, key: &str) -> &str {
        self.poses.get(key).map(String::as_str).unwrap_or(DEFAULT_POSE)
    }

    pub fn expression_keys(&self) -> impl Iterator<Item = &str> {
        self.expressions.keys().map(String::as_str)
    }

    pub fn pose_keys(&self) -> impl Iterator<Item = &str> {
        self.poses.keys().map(String::as_str)
    }

    /// Every part needed to build a prompt is present
    pub fn is_complete(&self) -> bool {
        !self.base_prompt.trim().is_empty()
            && !self.identity.trim().is_empty()
            && !self.outfit.trim().is_empty()
            && !self.style.trim().is_empty()
            && !self.expressions.is_empty()
            && !self.poses.is_empty()
    }

    /// Fill empty base/style fragments from the shared style guide
    pub fn with_style_defaults(mut self, base_prompt: &str, style: &str) -> Self {
        if self.base_prompt.trim().is_empty() {
            self.base_prompt = base_prompt.to_string();
        }
        if self.style.trim().is_empty() {
            self.style = style.to_string();
        }
        self
    }
}
