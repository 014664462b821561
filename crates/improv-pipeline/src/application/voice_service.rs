//! Voice Application Service (Use Case)
//!
//! Dialogue audio, voice design and voice auditions through the speech
//! service.

use std::path::PathBuf;
use std::sync::Arc;

use improv::{
    ArtifactName, ArtifactRepository, DialogueLine, GenerationLogEntry,
    GenerationLogRepository, Payload, PipelineError, SettingsSnapshot, SpeechRequest,
    SpeechSynthesizer, VoiceDesignBrief, VoiceInfo, VoiceSettings, VoiceSettingsOverride,
};

use super::persist;
use crate::catalog::Catalog;
use crate::layout::ProjectLayout;

/// A synthesized dialogue line
#[derive(Debug, Clone)]
pub struct LineOutcome {
    pub file: PathBuf,
    pub voice_id: String,
    pub settings: VoiceSettings,
}

/// One saved voice-design preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignedVoice {
    pub voice_id: String,
    pub audio: PathBuf,
    pub voice_id_file: PathBuf,
}

/// One candidate voice reading the audition line
#[derive(Debug)]
pub struct AuditionTake {
    pub name: String,
    pub voice_id: String,
    pub result: Result<PathBuf, PipelineError>,
}

/// Application service for speech generation
pub struct VoiceService<S, A, L>
where
    S: SpeechSynthesizer,
    A: ArtifactRepository,
    L: GenerationLogRepository,
{
    synthesizer: Arc<S>,
    artifacts: Arc<A>,
    log: Arc<L>,
    catalog: Arc<Catalog>,
    layout: ProjectLayout,
    model_id: String,
}

impl<S, A, L> VoiceService<S, A, L>
where
    S: SpeechSynthesizer,
    A: ArtifactRepository,
    L: GenerationLogRepository,
{
    pub fn new(
        synthesizer: Arc<S>,
        artifacts: Arc<A>,
        log: Arc<L>,
        catalog: Arc<Catalog>,
        layout: ProjectLayout,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            artifacts,
            log,
            catalog,
            layout,
            model_id: model_id.into(),
        }
    }

    /// Synthesize one script line to `episodes/<episode>/audio/<line>.mp3`
    pub async fn generate_line(
        &self,
        episode: &str,
        line: &DialogueLine,
        overrides: &VoiceSettingsOverride,
    ) -> Result<LineOutcome, PipelineError> {
        let voice_id = self.catalog.voice_id(&line.character)?.to_string();
        let settings = self
            .catalog
            .voice_settings(line.settings_key())
            .apply(overrides);
        settings.validate()?;

        let request = SpeechRequest {
            text: line.text.clone(),
            voice_id: voice_id.clone(),
            model_id: self.model_id.clone(),
            settings,
        };

        tracing::info!(
            line = %line.id,
            character = %line.character,
            profile = line.settings_key(),
            "Generating audio"
        );
        let audio = self.synthesizer.synthesize(&request).await?;

        let dir = self.layout.audio_dir(episode);
        let name = ArtifactName::single(&line.id, "mp3");
        let snapshot = SettingsSnapshot::Speech {
            voice_id: request.voice_id.clone(),
            model_id: request.model_id.clone(),
            settings,
        };

        let files = persist(
            self.artifacts.as_ref(),
            self.log.as_ref(),
            &dir,
            &name,
            &[Payload::Bytes(audio)],
            |files| GenerationLogEntry::new(&line.character, &line.text, snapshot, None, files),
        )
        .await?;

        let file = files.into_iter().next().ok_or_else(|| {
            PipelineError::invalid_response("speech service", "no audio was written")
        })?;

        Ok(LineOutcome {
            file,
            voice_id,
            settings,
        })
    }

    pub async fn list_voices(&self) -> Result<Vec<VoiceInfo>, PipelineError> {
        self.synthesizer.list_voices().await
    }

    /// Design candidate voices and save each preview beside its voice id
    pub async fn design_voice(
        &self,
        episode: &str,
        brief: &VoiceDesignBrief,
    ) -> Result<Vec<DesignedVoice>, PipelineError> {
        tracing::info!(character = %brief.character, "Designing voice");
        let previews = self.synthesizer.design_voice(brief).await?;
        if previews.is_empty() {
            return Err(PipelineError::invalid_response(
                "speech service",
                "voice design returned no previews",
            ));
        }

        let dir = self.layout.voice_designs_dir(episode, &brief.character);
        let stem = format!("{}_design", brief.character);
        let payloads: Vec<Payload> = previews
            .iter()
            .map(|p| Payload::Base64(p.audio_base64.clone()))
            .collect();

        let (audio_files, failure) = match self
            .artifacts
            .save(&dir, &ArtifactName::numbered(&stem, "mp3"), &payloads)
            .await
        {
            Ok(files) => (files, None),
            Err(err @ PipelineError::PartialWrite { .. }) => (err.written_paths().to_vec(), Some(err)),
            Err(err) => return Err(err),
        };

        // Sidecars for whatever audio made it to disk
        let mut written = audio_files.clone();
        let mut sidecar_failure = None;
        let mut designed = Vec::with_capacity(audio_files.len());
        for (index, (audio, preview)) in audio_files.into_iter().zip(&previews).enumerate() {
            let sidecar = ArtifactName::single(format!("{stem}_{index}_voice_id"), "txt");
            let saved = self
                .artifacts
                .save(
                    &dir,
                    &sidecar,
                    &[Payload::Bytes(preview.generated_voice_id.clone().into_bytes())],
                )
                .await;

            match saved {
                Ok(files) => {
                    let voice_id_file = files.into_iter().next().unwrap_or_default();
                    written.push(voice_id_file.clone());
                    designed.push(DesignedVoice {
                        voice_id: preview.generated_voice_id.clone(),
                        audio,
                        voice_id_file,
                    });
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Voice id sidecar failed");
                    if sidecar_failure.is_none() {
                        sidecar_failure = Some((index, format!("voice id sidecar: {e}")));
                    }
                }
            }
        }

        match (failure, sidecar_failure) {
            (None, None) => Ok(designed),
            (Some(PipelineError::PartialWrite {
                failed_index,
                total,
                reason,
                ..
            }), _) => Err(PipelineError::PartialWrite {
                written,
                failed_index,
                total,
                reason,
            }),
            (Some(err), _) => Err(err),
            (None, Some((failed_index, reason))) => Err(PipelineError::PartialWrite {
                written,
                failed_index,
                total: previews.len(),
                reason,
            }),
        }
    }

    /// Read `line` with every candidate voice; one failure does not stop the rest
    pub async fn audition(
        &self,
        episode: &str,
        character: &str,
        line: &str,
        candidates: &[(String, String)],
    ) -> Vec<AuditionTake> {
        let dir = self.layout.voice_tests_dir(episode);
        let mut takes = Vec::with_capacity(candidates.len());

        for (name, voice_id) in candidates {
            let request = SpeechRequest {
                text: line.to_string(),
                voice_id: voice_id.clone(),
                model_id: self.model_id.clone(),
                settings: VoiceSettings::default(),
            };

            let result = match self.synthesizer.synthesize(&request).await {
                Ok(audio) => self
                    .artifacts
                    .save(
                        &dir,
                        &ArtifactName::single(format!("{character}_test_{name}"), "mp3"),
                        &[Payload::Bytes(audio)],
                    )
                    .await
                    .and_then(|files| {
                        files.into_iter().next().ok_or_else(|| {
                            PipelineError::invalid_response("speech service", "no audio was written")
                        })
                    }),
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                tracing::warn!(voice = %name, error = %e, "Audition take failed");
            }

            takes.push(AuditionTake {
                name: name.clone(),
                voice_id: voice_id.clone(),
                result,
            });
        }

        takes
    }
}
