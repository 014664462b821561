//! Records - Generation log entries and the golden-seed registry
//!
//! Pure domain entities; persistence lives behind the repository ports.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{GenerationMode, ImageSettings, Seed, VoiceSettings};

/// Settings captured at generation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingsSnapshot {
    Image {
        mode: GenerationMode,
        negative_prompt: String,
        #[serde(flatten)]
        settings: ImageSettings,
    },
    Speech {
        voice_id: String,
        model_id: String,
        #[serde(flatten)]
        settings: VoiceSettings,
    },
}

/// One line of `<character>_generations.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub character: String,
    pub prompt: String,
    pub settings: SettingsSnapshot,
    pub seed: Option<i64>,
    pub output_files: Vec<PathBuf>,
}

impl GenerationLogEntry {
    pub fn new(
        character: impl Into<String>,
        prompt: impl Into<String>,
        settings: SettingsSnapshot,
        seed: Option<i64>,
        output_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            character: character.into(),
            prompt: prompt.into(),
            settings,
            seed,
            output_files,
        }
    }
}

/// A saved seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub description: String,
    pub saved_at: DateTime<Local>,
}

/// Golden seeds for one character, keyed by seed value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedRegistry {
    entries: BTreeMap<String, SeedRecord>,
}

impl SeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `seed`; returns the previous one
    pub fn upsert(
        &mut self,
        seed: Seed,
        description: impl Into<String>,
        saved_at: DateTime<Local>,
    ) -> Option<SeedRecord> {
        self.entries.insert(
            seed.key(),
            SeedRecord {
                description: description.into(),
                saved_at,
            },
        )
    }

    pub fn get(&self, seed: Seed) -> Option<&SeedRecord> {
        self.entries.get(&seed.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SeedRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_same_seed_keeps_one_entry() {
        let mut registry = SeedRegistry::new();
        registry.upsert(Seed(12345), "hook pose", Local::now());
        registry.upsert(Seed(12345), "hook pose", Local::now());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_upsert_overwrites_description_only_for_that_seed() {
        let mut registry = SeedRegistry::new();
        registry.upsert(Seed(12345), "hook pose", Local::now());
        registry.upsert(Seed(777), "outro", Local::now());
        let previous = registry.upsert(Seed(12345), "final pick", Local::now());

        assert_eq!(previous.unwrap().description, "hook pose");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(Seed(12345)).unwrap().description, "final pick");
        assert_eq!(registry.get(Seed(777)).unwrap().description, "outro");
    }

    #[test]
    fn test_registry_json_shape() {
        let mut registry = SeedRegistry::new();
        registry.upsert(Seed(42), "wide grin", Local::now());
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["42"]["description"], "wide grin");
        assert!(json["42"]["saved_at"].is_string());
    }

    #[test]
    fn test_log_entry_serializes_flat_settings() {
        let entry = GenerationLogEntry::new(
            "casey",
            "B, I",
            SettingsSnapshot::Image {
                mode: GenerationMode::Txt2Img,
                negative_prompt: "blurry".to_string(),
                settings: ImageSettings::asset(),
            },
            Some(7),
            vec![PathBuf::from("casey_neutral_20250101_000000_00.png")],
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["settings"]["kind"], "image");
        assert_eq!(json["settings"]["steps"], 20);
        assert_eq!(json["seed"], 7);

        let back: GenerationLogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.settings, entry.settings);
    }
}
