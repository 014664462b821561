//! End-to-end flows through the application services with in-memory
//! service fakes and the real filesystem repositories.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use improv::{
    GenerationLogRepository, GenerationMode, ImageGenerator, ImageRequest, ImageResult,
    ImageSettingsOverride, ModelInfo, Payload, PipelineError, Seed, SettingsSnapshot,
    SpeechRequest, SpeechSynthesizer, VoiceDesignBrief, VoiceInfo, VoicePreview,
    VoiceSettingsOverride,
};
use improv_pipeline::{
    load_templates, Catalog, CharacterRequest, FsArtifactRepository, FsGenerationLog,
    FsSeedRepository, ImageService, ProjectLayout, SeedService, VoiceService,
};

// ============================================
// Fakes
// ============================================

#[derive(Default)]
struct FakeImages {
    /// `Some(status)` makes every generation fail with that status
    reject_with: Option<u16>,
    loaded_model: Mutex<String>,
    requests: Mutex<Vec<(ImageRequest, Option<Vec<u8>>)>>,
    model_switches: Mutex<Vec<String>>,
}

impl FakeImages {
    fn with_model(model: &str) -> Self {
        Self {
            loaded_model: Mutex::new(model.to_string()),
            ..Default::default()
        }
    }

    fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Default::default()
        }
    }

    fn respond(
        &self,
        request: &ImageRequest,
        init: Option<&[u8]>,
    ) -> Result<ImageResult, PipelineError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), init.map(<[u8]>::to_vec)));

        if let Some(status) = self.reject_with {
            return Err(PipelineError::RequestRejected {
                status,
                body: "CUDA out of memory".to_string(),
            });
        }

        let images = (0..request.settings.batch_size)
            .map(|i| Payload::encode(format!("image {i}").as_bytes()))
            .collect();
        Ok(ImageResult {
            images,
            seed: Some(424242),
            info: serde_json::json!({ "seed": 424242 }),
        })
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn txt2img(&self, request: &ImageRequest) -> Result<ImageResult, PipelineError> {
        self.respond(request, None)
    }

    async fn img2img(
        &self,
        request: &ImageRequest,
        init_image: &[u8],
    ) -> Result<ImageResult, PipelineError> {
        self.respond(request, Some(init_image))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, PipelineError> {
        Ok(Vec::new())
    }

    async fn current_model(&self) -> Result<String, PipelineError> {
        Ok(self.loaded_model.lock().unwrap().clone())
    }

    async fn set_model(&self, model: &str) -> Result<(), PipelineError> {
        self.model_switches.lock().unwrap().push(model.to_string());
        *self.loaded_model.lock().unwrap() = model.to_string();
        Ok(())
    }
}

#[derive(Default)]
struct FakeSpeech {
    requests: Mutex<Vec<SpeechRequest>>,
    fail_voice: Option<String>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_voice.as_deref() == Some(request.voice_id.as_str()) {
            return Err(PipelineError::unavailable("speech service", "connection refused"));
        }
        Ok(format!("mp3:{}", request.text).into_bytes())
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, PipelineError> {
        Ok(vec![VoiceInfo {
            voice_id: "ErXwobaYiN019PkySvjV".to_string(),
            name: "Antoni".to_string(),
        }])
    }

    async fn design_voice(
        &self,
        _brief: &VoiceDesignBrief,
    ) -> Result<Vec<VoicePreview>, PipelineError> {
        Ok((0..3)
            .map(|i| VoicePreview {
                generated_voice_id: format!("generated-{i}"),
                // "preview"
                audio_base64: "cHJldmlldw==".to_string(),
            })
            .collect())
    }
}

// ============================================
// Harness
// ============================================

type Images = ImageService<FakeImages, FsArtifactRepository, FsGenerationLog>;

async fn image_service(
    root: &Path,
    generator: Arc<FakeImages>,
) -> (Images, Arc<FsGenerationLog>) {
    let catalog = Catalog::embedded().unwrap();
    let layout = ProjectLayout::new(root);
    let load = load_templates(
        &layout.prompts_dir(),
        &catalog.characters(),
        &catalog.style().base,
        &catalog.style().quality,
    )
    .await
    .unwrap();

    let log = Arc::new(FsGenerationLog::new(layout.logs_dir()));
    let service = ImageService::new(
        generator,
        Arc::new(FsArtifactRepository::new()),
        log.clone(),
        Arc::new(load.store),
        catalog.style().clone(),
        layout,
    );
    (service, log)
}

fn voice_service(
    root: &Path,
    synthesizer: Arc<FakeSpeech>,
) -> (
    VoiceService<FakeSpeech, FsArtifactRepository, FsGenerationLog>,
    Arc<FsGenerationLog>,
) {
    let layout = ProjectLayout::new(root);
    let log = Arc::new(FsGenerationLog::new(layout.logs_dir()));
    let service = VoiceService::new(
        synthesizer,
        Arc::new(FsArtifactRepository::new()),
        log.clone(),
        Arc::new(Catalog::embedded().unwrap()),
        layout,
        "eleven_multilingual_v2",
    );
    (service, log)
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

// ============================================
// Image flows
// ============================================

#[tokio::test]
async fn test_character_generation_writes_batch_and_logs() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model(
        "juggernautXL_ragnarokBy.safetensors [dd08fa32f9]",
    ));
    let (service, log) = image_service(tmp.path(), generator.clone()).await;

    let mut request = CharacterRequest::new("casey");
    request.pose = "arms_crossed".to_string();
    request.expression = "deadpan".to_string();

    let outcome = service.generate_character(&request).await.unwrap();

    assert_eq!(outcome.files.len(), 4);
    assert_eq!(outcome.seed, Some(424242));
    for file in &outcome.files {
        assert!(file.starts_with(tmp.path().join("characters/casey/poses")));
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("casey_arms_crossed_"));
    }
    assert!(outcome.prompt.contains("arms crossed over chest"));
    assert!(generator.model_switches.lock().unwrap().is_empty());

    let entries = log.entries("casey").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].output_files, outcome.files);
    assert_eq!(entries[0].seed, Some(424242));
    assert_eq!(entries[0].prompt, outcome.prompt);
}

#[tokio::test]
async fn test_failed_log_append_still_reports_saved_files() {
    let tmp = tempfile::tempdir().unwrap();
    // A plain file where the log directory should be
    std::fs::create_dir_all(tmp.path().join("pipeline")).unwrap();
    std::fs::write(tmp.path().join("pipeline/logs"), "not a dir").unwrap();

    let generator = Arc::new(FakeImages::with_model(
        "juggernautXL_ragnarokBy.safetensors [dd08fa32f9]",
    ));
    let (service, _log) = image_service(tmp.path(), generator).await;

    let err = service
        .generate_character(&CharacterRequest::new("casey"))
        .await
        .unwrap_err();

    match &err {
        PipelineError::PartialWrite { total, reason, .. } => {
            assert_eq!(*total, 4);
            assert!(reason.contains("generation log"));
        }
        other => panic!("expected PartialWrite, got {other:?}"),
    }
    assert_eq!(err.written_paths().len(), 4);
    for file in err.written_paths() {
        assert!(file.exists());
    }
}

#[tokio::test]
async fn test_unknown_character_fails_before_any_request() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::default());
    let (service, log) = image_service(tmp.path(), generator.clone()).await;

    let err = service
        .generate_character(&CharacterRequest::new("kevin"))
        .await
        .unwrap_err();

    match err {
        PipelineError::NotFound { kind, available, .. } => {
            assert_eq!(kind, "character");
            assert!(available.contains(&"casey".to_string()));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(generator.requests.lock().unwrap().is_empty());
    assert!(log.entries("kevin").await.unwrap().is_empty());
    assert_eq!(count_files(&tmp.path().join("characters")), 0);
}

#[tokio::test]
async fn test_rejected_generation_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::rejecting(500));
    let (service, log) = image_service(tmp.path(), generator.clone()).await;
    let catalog = Catalog::embedded().unwrap();
    let shot = catalog.shot("shot03_rex_deadpan").unwrap();

    let err = service
        .generate_shot(
            &catalog.episode().id,
            shot,
            Seed::RANDOM,
            None,
            &ImageSettingsOverride::default(),
        )
        .await
        .unwrap_err();

    match err {
        PipelineError::RequestRejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "CUDA out of memory");
        }
        other => panic!("expected RequestRejected, got {other:?}"),
    }
    assert_eq!(generator.requests.lock().unwrap().len(), 1);
    assert_eq!(count_files(&tmp.path().join("episodes")), 0);
    assert!(log.entries("rex").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_shot_uses_framing_and_shot_preset() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model("sd_xl_base_1.0.safetensors"));
    let (service, _log) = image_service(tmp.path(), generator.clone()).await;
    let catalog = Catalog::embedded().unwrap();
    let shot = catalog.shot("shot01_casey_hook").unwrap();

    let outcome = service
        .generate_shot(
            &catalog.episode().id,
            shot,
            Seed(77),
            None,
            &ImageSettingsOverride::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 3);
    assert!(outcome.files[0].starts_with(tmp.path().join("episodes/001-kevin-identity/shots")));

    let requests = generator.requests.lock().unwrap();
    let (request, init) = &requests[0];
    assert!(init.is_none());
    assert_eq!(request.settings.width, 1024);
    assert_eq!(request.seed, Seed(77));
    assert!(request.negative_prompt.ends_with("feet visible"));

    // style base, framing, identity, ..., action, style quality
    let style = catalog.style();
    assert!(request.prompt.starts_with(&format!("{}, {}", style.base, style.framing)));
    assert!(request.prompt.contains("about to speak, welcoming"));
    assert!(request.prompt.ends_with(&style.quality));

    // shot preset names no checkpoint, so nothing is switched
    assert!(generator.model_switches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shot_negative_prompt_override() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model("sd_xl_base_1.0.safetensors"));
    let (service, _log) = image_service(tmp.path(), generator.clone()).await;
    let catalog = Catalog::embedded().unwrap();
    let shot = catalog.shot("shot01_casey_hook").unwrap();

    service
        .generate_shot(
            &catalog.episode().id,
            shot,
            Seed(77),
            Some("  extra fingers, watermark  "),
            &ImageSettingsOverride::default(),
        )
        .await
        .unwrap();

    // blank falls back to the shared shot negative
    service
        .generate_shot(
            &catalog.episode().id,
            shot,
            Seed(78),
            Some("   "),
            &ImageSettingsOverride::default(),
        )
        .await
        .unwrap();

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests[0].0.negative_prompt, "extra fingers, watermark");
    assert_eq!(requests[1].0.negative_prompt, catalog.style().shot_negative);
}

#[tokio::test]
async fn test_negative_seed_is_rejected_before_any_request() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model("sd_xl_base_1.0.safetensors"));
    let (service, _log) = image_service(tmp.path(), generator.clone()).await;
    let catalog = Catalog::embedded().unwrap();
    let shot = catalog.shot("shot01_casey_hook").unwrap();

    let err = service
        .generate_shot(
            &catalog.episode().id,
            shot,
            Seed(-5),
            None,
            &ImageSettingsOverride::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert!(generator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_model_switch_before_generation() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model("sd_xl_base_1.0.safetensors [31e35c80fc]"));
    let (service, _log) = image_service(tmp.path(), generator.clone()).await;

    service
        .generate_character(&CharacterRequest::new("rex"))
        .await
        .unwrap();

    assert_eq!(
        *generator.model_switches.lock().unwrap(),
        vec!["juggernautXL_ragnarokBy.safetensors".to_string()]
    );
}

#[tokio::test]
async fn test_img2img_reads_default_reference() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(tmp.path());
    std::fs::create_dir_all(layout.character_dir("fizz")).unwrap();
    std::fs::write(layout.reference_image("fizz"), b"reference pixels").unwrap();

    let generator = Arc::new(FakeImages::default());
    let (service, log) = image_service(tmp.path(), generator.clone()).await;

    let mut request = CharacterRequest::new("fizz");
    request.mode = GenerationMode::Img2Img;
    request.seed = Seed(5);
    request.overrides = ImageSettingsOverride {
        denoising_strength: Some(0.35),
        model: Some(String::new()),
        batch_size: Some(2),
        ..Default::default()
    };

    let outcome = service.generate_character(&request).await.unwrap();
    assert_eq!(outcome.files.len(), 2);

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests[0].1.as_deref(), Some(&b"reference pixels"[..]));
    assert_eq!(requests[0].0.settings.denoising_strength, Some(0.35));

    let entries = log.entries("fizz").await.unwrap();
    match &entries[0].settings {
        SettingsSnapshot::Image { mode, .. } => assert_eq!(*mode, GenerationMode::Img2Img),
        other => panic!("expected image snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn test_img2img_without_reference_fails_before_request() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::default());
    let (service, _log) = image_service(tmp.path(), generator.clone()).await;

    let mut request = CharacterRequest::new("dot");
    request.mode = GenerationMode::Img2Img;

    let err = service.generate_character(&request).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound { .. }));
    assert!(generator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_log_grows_by_one_per_generation() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeImages::with_model("juggernautXL_ragnarokBy.safetensors"));
    let (service, log) = image_service(tmp.path(), generator).await;

    for n in 1..=3 {
        let mut request = CharacterRequest::new("harper");
        request.seed = Seed(n);
        service.generate_character(&request).await.unwrap();
        assert_eq!(log.entries("harper").await.unwrap().len(), n as usize);
    }
}

// ============================================
// Voice flows
// ============================================

#[tokio::test]
async fn test_line_uses_voice_profile_override() {
    let tmp = tempfile::tempdir().unwrap();
    let synthesizer = Arc::new(FakeSpeech::default());
    let (service, log) = voice_service(tmp.path(), synthesizer.clone());
    let catalog = Catalog::embedded().unwrap();
    let line = catalog.line("02_casey_reading").unwrap();

    let outcome = service
        .generate_line("001-kevin-identity", line, &VoiceSettingsOverride::default())
        .await
        .unwrap();

    assert_eq!(
        outcome.file,
        tmp.path().join("episodes/001-kevin-identity/audio/02_casey_reading.mp3")
    );
    assert_eq!(outcome.voice_id, "wAQta5nXit6sNLk15rnQ");

    let request = synthesizer.requests.lock().unwrap()[0].clone();
    assert_eq!(request.settings.stability, 0.15);
    assert_eq!(request.settings.style, 1.0);
    assert_eq!(request.model_id, "eleven_multilingual_v2");

    let entries = log.entries("casey").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].seed, None);
    assert_eq!(entries[0].prompt, line.text);
}

#[tokio::test]
async fn test_design_saves_previews_with_voice_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let (service, _log) = voice_service(tmp.path(), Arc::new(FakeSpeech::default()));
    let catalog = Catalog::embedded().unwrap();
    let brief = catalog.design_brief("rex").unwrap();

    let designed = service
        .design_voice("001-kevin-identity", &brief)
        .await
        .unwrap();

    assert_eq!(designed.len(), 3);
    let dir = tmp
        .path()
        .join("episodes/001-kevin-identity/audio/voice_designs/rex");
    assert_eq!(designed[1].audio, dir.join("rex_design_1.mp3"));
    assert_eq!(
        std::fs::read_to_string(dir.join("rex_design_2_voice_id.txt")).unwrap(),
        "generated-2"
    );
}

#[tokio::test]
async fn test_design_reports_files_written_before_a_sidecar_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let (service, _log) = voice_service(tmp.path(), Arc::new(FakeSpeech::default()));
    let catalog = Catalog::embedded().unwrap();
    let brief = catalog.design_brief("rex").unwrap();

    let dir = tmp
        .path()
        .join("episodes/001-kevin-identity/audio/voice_designs/rex");
    // Block the second sidecar with a directory of the same name
    std::fs::create_dir_all(dir.join("rex_design_1_voice_id.txt")).unwrap();

    let err = service
        .design_voice("001-kevin-identity", &brief)
        .await
        .unwrap_err();

    match &err {
        PipelineError::PartialWrite {
            failed_index,
            total,
            ..
        } => {
            assert_eq!(*failed_index, 1);
            assert_eq!(*total, 3);
        }
        other => panic!("expected PartialWrite, got {other:?}"),
    }

    let written = err.written_paths();
    assert_eq!(written.len(), 5);
    assert!(written.contains(&dir.join("rex_design_0.mp3")));
    assert!(written.contains(&dir.join("rex_design_2.mp3")));
    assert!(written.contains(&dir.join("rex_design_0_voice_id.txt")));
    assert!(written.contains(&dir.join("rex_design_2_voice_id.txt")));
    assert!(!written.contains(&dir.join("rex_design_1_voice_id.txt")));
}

#[tokio::test]
async fn test_audition_continues_past_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let synthesizer = Arc::new(FakeSpeech {
        fail_voice: Some("bad".to_string()),
        ..Default::default()
    });
    let (service, _log) = voice_service(tmp.path(), synthesizer);

    let takes = service
        .audition(
            "001-kevin-identity",
            "casey",
            "internet improv presents",
            &[
                ("adam".to_string(), "pNInz6obpgDQGcFmaJgB".to_string()),
                ("broken".to_string(), "bad".to_string()),
                ("george".to_string(), "JBFqnCBsd6RMkjVDRZzb".to_string()),
            ],
        )
        .await;

    assert_eq!(takes.len(), 3);
    assert!(takes[0].result.is_ok());
    assert!(matches!(
        takes[1].result,
        Err(PipelineError::ServiceUnavailable { .. })
    ));
    let george = takes[2].result.as_ref().unwrap();
    assert!(george.ends_with("voice_tests/casey_test_george.mp3"));
}

// ============================================
// Seeds
// ============================================

#[tokio::test]
async fn test_seed_resave_replaces_description() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(tmp.path());
    let service = SeedService::new(Arc::new(FsSeedRepository::new(layout.seeds_dir())));

    service.save("casey", Seed(12345), "hook pose").await.unwrap();
    let registry = service.save("casey", Seed(12345), "final").await.unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(Seed(12345)).unwrap().description, "final");
    assert!(layout.seeds_dir().join("casey_seeds.json").exists());
}
