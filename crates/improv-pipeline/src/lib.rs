//! Improv Pipeline
//!
//! Adapters and use cases for the Internet Improv content pipeline.
//!
//! - **Adapters** (`adapters/`): Stable Diffusion WebUI and ElevenLabs
//!   clients, filesystem artifact/log/seed repositories, template loader
//! - **Application** (`application/`): image, voice and seed services
//! - **Catalog** (`catalog`): style guide, roster, shots, script, casting
//! - **Layout** (`layout`): where everything lives under a project root

pub mod adapters;
pub mod application;
pub mod catalog;
pub mod layout;

pub use adapters::{
    load_templates, ElevenLabsClient, ElevenLabsConfig, FsArtifactRepository, FsGenerationLog,
    FsSeedRepository, SdWebUiClient, SdWebUiConfig, TemplateLoad,
};
pub use application::{
    AuditionTake, CharacterRequest, DesignedVoice, ImageOutcome, ImageService, LineOutcome,
    SeedService, ServiceStatus, VoiceService,
};
pub use catalog::{Audition, Catalog, Episode, StyleGuide};
pub use layout::ProjectLayout;
