//! Image Application Service (Use Case)
//!
//! Character assets and episode shots through the image service.

use std::path::PathBuf;
use std::sync::Arc;

use improv::{
    ArtifactName, ArtifactRepository, GenerationLogEntry, GenerationLogRepository,
    GenerationMode, ImageGenerator, ImageRequest, ImageResult, ImageSettings,
    ImageSettingsOverride, ModelInfo, PipelineError, PromptBuilder, Seed, SettingsSnapshot,
    ShotSpec, TemplateStore,
};

use super::persist;
use crate::catalog::StyleGuide;
use crate::layout::ProjectLayout;

fn check_seed(seed: Seed) -> Result<(), PipelineError> {
    if seed.is_valid() {
        Ok(())
    } else {
        Err(PipelineError::Validation(format!(
            "invalid seed {}; use a non-negative value or -1",
            seed.0
        )))
    }
}

/// One character asset generation
#[derive(Debug, Clone)]
pub struct CharacterRequest {
    pub character: String,
    pub expression: String,
    pub pose: String,
    pub extra: Vec<String>,
    pub mode: GenerationMode,
    /// img2img reference; `characters/<id>/reference.png` when `None`
    pub reference: Option<PathBuf>,
    pub seed: Seed,
    pub negative_prompt: Option<String>,
    pub overrides: ImageSettingsOverride,
    /// Output directory; `characters/<id>/poses` when `None`
    pub output_dir: Option<PathBuf>,
}

impl CharacterRequest {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            expression: "neutral".to_string(),
            pose: "standing_neutral".to_string(),
            extra: Vec::new(),
            mode: GenerationMode::default(),
            reference: None,
            seed: Seed::RANDOM,
            negative_prompt: None,
            overrides: ImageSettingsOverride::default(),
            output_dir: None,
        }
    }
}

/// What a finished image generation produced
#[derive(Debug, Clone)]
pub struct ImageOutcome {
    pub files: Vec<PathBuf>,
    pub seed: Option<i64>,
    pub prompt: String,
    pub settings: ImageSettings,
}

/// Image service reachability and loaded checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub reachable: bool,
    pub model: Option<String>,
}

/// Application service for image generation
pub struct ImageService<G, A, L>
where
    G: ImageGenerator,
    A: ArtifactRepository,
    L: GenerationLogRepository,
{
    generator: Arc<G>,
    artifacts: Arc<A>,
    log: Arc<L>,
    templates: Arc<TemplateStore>,
    style: StyleGuide,
    layout: ProjectLayout,
}

impl<G, A, L> ImageService<G, A, L>
where
    G: ImageGenerator,
    A: ArtifactRepository,
    L: GenerationLogRepository,
{
    pub fn new(
        generator: Arc<G>,
        artifacts: Arc<A>,
        log: Arc<L>,
        templates: Arc<TemplateStore>,
        style: StyleGuide,
        layout: ProjectLayout,
    ) -> Self {
        Self {
            generator,
            artifacts,
            log,
            templates,
            style,
            layout,
        }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Prompt a character generation would send, without calling anything
    pub fn preview_prompt(
        &self,
        character: &str,
        expression: &str,
        pose: &str,
        extra: &[String],
    ) -> Result<String, PipelineError> {
        let template = self.templates.get_character(character)?;
        Ok(PromptBuilder::new().build(template, expression, pose, extra))
    }

    /// Prompt a shot generation would send
    pub fn preview_shot_prompt(&self, shot: &ShotSpec) -> Result<String, PipelineError> {
        let template = self.templates.get_character(&shot.character)?;
        Ok(self.shot_builder().build(
            template,
            &shot.expression,
            &shot.pose,
            &shot.extra_fragments(),
        ))
    }

    pub async fn status(&self) -> Result<ServiceStatus, PipelineError> {
        if !self.generator.health_check().await? {
            return Ok(ServiceStatus {
                reachable: false,
                model: None,
            });
        }
        let model = self.generator.current_model().await?;
        Ok(ServiceStatus {
            reachable: true,
            model: Some(model),
        })
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, PipelineError> {
        self.generator.list_models().await
    }

    pub async fn set_model(&self, model: &str) -> Result<(), PipelineError> {
        self.generator.set_model(model).await
    }

    /// Generate character assets (txt2img or img2img)
    pub async fn generate_character(
        &self,
        request: &CharacterRequest,
    ) -> Result<ImageOutcome, PipelineError> {
        let template = self.templates.get_character(&request.character)?;
        check_seed(request.seed)?;

        let prompt = PromptBuilder::new().build(
            template,
            &request.expression,
            &request.pose,
            &request.extra,
        );
        let negative_prompt = improv::resolve_negative_prompt(
            request.negative_prompt.as_deref(),
            Some(template),
            &self.style.negative,
        );

        let layered = template
            .recommended_settings
            .clone()
            .unwrap_or_default()
            .merge(&request.overrides);
        let settings = ImageSettings::asset().apply(&layered);
        settings.validate()?;

        // Read the reference before touching the network
        let reference = match request.mode {
            GenerationMode::Img2Img => {
                let path = request
                    .reference
                    .clone()
                    .unwrap_or_else(|| self.layout.reference_image(&request.character));
                Some(self.artifacts.read(&path).await?)
            }
            GenerationMode::Txt2Img => None,
        };

        let image_request = ImageRequest {
            prompt,
            negative_prompt,
            settings,
            seed: request.seed,
        };

        self.ensure_model(image_request.settings.model.as_deref())
            .await?;

        tracing::info!(
            character = %request.character,
            mode = %request.mode,
            pose = %request.pose,
            expression = %request.expression,
            "Generating character"
        );

        let result = match &reference {
            Some(init) => self.generator.img2img(&image_request, init).await?,
            None => self.generator.txt2img(&image_request).await?,
        };

        let dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.layout.poses_dir(&request.character));
        let name =
            ArtifactName::timestamped(&request.character, Some(request.pose.as_str()), "png");

        self.save(
            &request.character,
            request.mode,
            image_request,
            result,
            dir,
            name,
        )
        .await
    }

    /// Generate one episode shot
    ///
    /// `negative_prompt` replaces the shared shot negative when non-blank.
    pub async fn generate_shot(
        &self,
        episode: &str,
        shot: &ShotSpec,
        seed: Seed,
        negative_prompt: Option<&str>,
        overrides: &ImageSettingsOverride,
    ) -> Result<ImageOutcome, PipelineError> {
        let prompt = self.preview_shot_prompt(shot)?;
        check_seed(seed)?;

        let settings = ImageSettings::shot().apply(overrides);
        settings.validate()?;

        let image_request = ImageRequest {
            prompt,
            negative_prompt: improv::resolve_negative_prompt(
                negative_prompt,
                None,
                &self.style.shot_negative,
            ),
            settings,
            seed,
        };

        self.ensure_model(image_request.settings.model.as_deref())
            .await?;

        tracing::info!(shot = %shot.id, character = %shot.character, "Generating shot");
        let result = self.generator.txt2img(&image_request).await?;

        let dir = shot
            .output_dir
            .clone()
            .unwrap_or_else(|| self.layout.shots_dir(episode));
        let name = ArtifactName::timestamped(&shot.id, None, "png");

        self.save(
            &shot.character,
            GenerationMode::Txt2Img,
            image_request,
            result,
            dir,
            name,
        )
        .await
    }

    fn shot_builder(&self) -> PromptBuilder {
        PromptBuilder::new().with_framing(self.style.framing.clone())
    }

    /// Switch checkpoints when the settings ask for one that is not loaded
    async fn ensure_model(&self, wanted: Option<&str>) -> Result<(), PipelineError> {
        let Some(wanted) = wanted.filter(|m| !m.trim().is_empty()) else {
            return Ok(());
        };

        let current = self.generator.current_model().await?;
        if model_matches(&current, wanted) {
            return Ok(());
        }

        tracing::info!(from = %current, to = wanted, "Switching image model");
        self.generator.set_model(wanted).await
    }

    async fn save(
        &self,
        character: &str,
        mode: GenerationMode,
        request: ImageRequest,
        result: ImageResult,
        dir: PathBuf,
        name: ArtifactName,
    ) -> Result<ImageOutcome, PipelineError> {
        let seed = result.resolved_seed(request.seed);
        let ImageRequest {
            prompt,
            negative_prompt,
            settings,
            ..
        } = request;

        let snapshot = SettingsSnapshot::Image {
            mode,
            negative_prompt,
            settings: settings.clone(),
        };
        let files = persist(
            self.artifacts.as_ref(),
            self.log.as_ref(),
            &dir,
            &name,
            &result.images,
            |files| GenerationLogEntry::new(character, prompt.clone(), snapshot, seed, files),
        )
        .await?;

        tracing::info!(
            character,
            files = files.len(),
            seed = ?seed,
            dir = %dir.display(),
            "Saved generation"
        );

        Ok(ImageOutcome {
            files,
            seed,
            prompt,
            settings,
        })
    }
}

/// WebUI reports checkpoints as `name.safetensors [hash]`
pub fn model_matches(current: &str, wanted: &str) -> bool {
    let strip = |title: &str| -> String {
        let title = title.split(" [").next().unwrap_or(title).trim();
        title
            .strip_suffix(".safetensors")
            .or_else(|| title.strip_suffix(".ckpt"))
            .unwrap_or(title)
            .to_string()
    };
    strip(current) == strip(wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_matches_ignores_hash_and_extension() {
        assert!(model_matches(
            "juggernautXL_ragnarokBy.safetensors [dd08fa32f9]",
            "juggernautXL_ragnarokBy.safetensors"
        ));
        assert!(model_matches(
            "sd_xl_base_1.0.safetensors",
            "sd_xl_base_1.0"
        ));
        assert!(!model_matches(
            "sd_xl_base_1.0.safetensors [31e35c80fc]",
            "juggernautXL_ragnarokBy.safetensors"
        ));
    }

    #[test]
    fn test_character_request_defaults() {
        let request = CharacterRequest::new("casey");
        assert_eq!(request.pose, "standing_neutral");
        assert_eq!(request.expression, "neutral");
        assert!(request.seed.is_random());
        assert_eq!(request.mode, GenerationMode::Txt2Img);
    }
}
