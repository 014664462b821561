//! Wires config, project layout and catalog into the pipeline services

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use improv_pipeline::adapters::elevenlabs::API_KEY_ENV;
use improv_pipeline::{
    load_templates, Catalog, ElevenLabsClient, ElevenLabsConfig, FsArtifactRepository,
    FsGenerationLog, FsSeedRepository, ImageService, ProjectLayout, SdWebUiClient, SdWebUiConfig,
    SeedService, VoiceService,
};

use crate::config::{self, Config};

pub type Images = ImageService<SdWebUiClient, FsArtifactRepository, FsGenerationLog>;
pub type Voices = VoiceService<ElevenLabsClient, FsArtifactRepository, FsGenerationLog>;
pub type Seeds = SeedService<FsSeedRepository>;

/// Everything a command needs to build services for one project
pub struct Workspace {
    pub config: Config,
    pub layout: ProjectLayout,
    pub catalog: Arc<Catalog>,
}

impl Workspace {
    pub async fn open(project: Option<PathBuf>, catalog: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        let root = project.unwrap_or_else(|| config.project_root.clone());

        let catalog = match catalog {
            Some(path) => Catalog::from_path(&path)
                .await
                .with_context(|| format!("Failed to load catalog {:?}", path))?,
            None => Catalog::embedded().context("Embedded catalog is invalid")?,
        };

        Ok(Self {
            config,
            layout: ProjectLayout::new(root),
            catalog: Arc::new(catalog),
        })
    }

    pub fn episode(&self) -> &str {
        &self.catalog.episode().id
    }

    pub async fn image_service(&self) -> Result<Images> {
        let style = self.catalog.style();
        let load = load_templates(
            &self.layout.prompts_dir(),
            &self.catalog.characters(),
            &style.base,
            &style.quality,
        )
        .await?;

        if !load.fallbacks.is_empty() {
            eprintln!(
                "{} no prompt file in {:?} for: {} (using embedded templates)",
                "Warning:".yellow(),
                self.layout.prompts_dir(),
                load.fallbacks.join(", ")
            );
        }

        let client = SdWebUiClient::new(
            SdWebUiConfig::new(&self.config.image_api_url)
                .with_generation_timeout(self.config.image_timeout()),
        )?;

        Ok(ImageService::new(
            Arc::new(client),
            Arc::new(FsArtifactRepository::new()),
            Arc::new(FsGenerationLog::new(self.layout.logs_dir())),
            Arc::new(load.store),
            style.clone(),
            self.layout.clone(),
        ))
    }

    /// Fails before any request when no API key can be found
    pub fn voice_service(&self) -> Result<Voices> {
        let api_key = config::resolve_api_key(
            std::env::var(API_KEY_ENV).ok(),
            &self.layout.env_file(),
            self.config.api_key.as_deref(),
        )?;

        let client = ElevenLabsClient::new(
            ElevenLabsConfig::new(api_key)?
                .with_base_url(&self.config.speech_api_url)
                .with_timeout(self.config.speech_timeout()),
        )?;

        Ok(VoiceService::new(
            Arc::new(client),
            Arc::new(FsArtifactRepository::new()),
            Arc::new(FsGenerationLog::new(self.layout.logs_dir())),
            self.catalog.clone(),
            self.layout.clone(),
            self.config.tts_model.clone(),
        ))
    }

    pub fn seed_service(&self) -> Seeds {
        SeedService::new(Arc::new(FsSeedRepository::new(self.layout.seeds_dir())))
    }
}
