//! Application Layer (Use Cases)
//!
//! Runs the Template → Prompt → Generate → Persist flow against the
//! ports. Every call is awaited in order; nothing runs concurrently.

mod image_service;
mod seed_service;
mod voice_service;

pub use image_service::{
    model_matches, CharacterRequest, ImageOutcome, ImageService, ServiceStatus,
};
pub use seed_service::SeedService;
pub use voice_service::{AuditionTake, DesignedVoice, LineOutcome, VoiceService};

use std::path::{Path, PathBuf};

use improv::{
    ArtifactName, ArtifactRepository, GenerationLogEntry, GenerationLogRepository, Payload,
    PipelineError,
};

/// Save a batch and log whatever reached the disk
///
/// A partial write is still logged with the files that exist, then the
/// `PartialWrite` error is returned to the caller. A failed log append
/// also comes back as `PartialWrite` so the saved files stay visible.
pub(crate) async fn persist<A, L, F>(
    artifacts: &A,
    log: &L,
    dir: &Path,
    name: &ArtifactName,
    payloads: &[Payload],
    entry: F,
) -> Result<Vec<PathBuf>, PipelineError>
where
    A: ArtifactRepository + ?Sized,
    L: GenerationLogRepository + ?Sized,
    F: FnOnce(Vec<PathBuf>) -> GenerationLogEntry,
{
    match artifacts.save(dir, name, payloads).await {
        Ok(paths) => match log.append(&entry(paths.clone())).await {
            Ok(()) => Ok(paths),
            Err(e) => Err(PipelineError::PartialWrite {
                failed_index: paths.len(),
                total: paths.len(),
                written: paths,
                reason: format!("generation log: {e}"),
            }),
        },
        Err(PipelineError::PartialWrite {
            written,
            failed_index,
            total,
            reason,
        }) => {
            let reason = match log.append(&entry(written.clone())).await {
                Ok(()) => reason,
                Err(e) => format!("{reason}; generation log: {e}"),
            };
            Err(PipelineError::PartialWrite {
                written,
                failed_index,
                total,
                reason,
            })
        }
        Err(err) => Err(err),
    }
}
