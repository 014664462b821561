//! Adapters
//!
//! Implementations of the `improv` ports for the external services and
//! the local filesystem.

pub mod elevenlabs;
pub mod filesystem;
mod http;
pub mod sd_webui;

pub use elevenlabs::{ElevenLabsClient, ElevenLabsConfig};
pub use filesystem::{
    load_templates, FsArtifactRepository, FsGenerationLog, FsSeedRepository, TemplateLoad,
};
pub use sd_webui::{SdWebUiClient, SdWebUiConfig};
