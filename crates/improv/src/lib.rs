//! Improv Domain Library
//!
//! Core domain types and interfaces for the Internet Improv content
//! pipeline: character art from a diffusion server, dialogue from a
//! speech service, and the metadata needed to reproduce both.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Character templates, shots, dialogue, requests, records
//!   - `value_objects/`: Immutable settings and seeds
//!   - `services/`: Prompt Builder, Template Store, artifact naming
//!   - `errors`: The shared [`PipelineError`]
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `services/`: Image and speech generation
//!   - `repositories/`: Artifacts, generation log, seed registry
//!
//! # Usage
//!
//! ```rust,ignore
//! use improv::{build_prompt, TemplateStore};
//!
//! let casey = store.get_character("casey")?;
//! let prompt = build_prompt(casey, "neutral", "standing_neutral", &[] as &[&str]);
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    artifact_filename, build_prompt, join_fragments, resolve_negative_prompt, ArtifactName,
    CharacterTemplate, DialogueLine, GenerationLogEntry, GenerationMode, ImageRequest,
    ImageResult, ImageSettings, ImageSettingsOverride, ModelInfo, Payload, PipelineError,
    PromptBuilder, Seed, SeedRecord, SeedRegistry, SettingsSnapshot, ShotSpec, SpeechRequest,
    TemplateStore, VoiceDesignBrief, VoiceInfo, VoicePreview, VoiceSettings,
    VoiceSettingsOverride, DEFAULT_EXPRESSION, DEFAULT_NEGATIVE_PROMPT, DEFAULT_POSE,
    SHOT_NEGATIVE_PROMPT,
};
pub use ports::{
    ArtifactRepository, GenerationLogRepository, ImageGenerator, SeedRepository,
    SpeechSynthesizer,
};
