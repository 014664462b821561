//! Artifact writer
//!
//! Decodes payloads and writes them under deterministic names.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;

use improv::{ArtifactName, ArtifactRepository, Payload, PipelineError};

use super::{ensure_dir, write_atomic};

/// Writes generated artifacts to the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsArtifactRepository;

impl FsArtifactRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactRepository for FsArtifactRepository {
    async fn save(
        &self,
        dir: &Path,
        name: &ArtifactName,
        payloads: &[Payload],
    ) -> Result<Vec<PathBuf>, PipelineError> {
        ensure_dir(dir).await?;

        // One timestamp per batch so siblings share it
        let started = Local::now();
        let mut written = Vec::with_capacity(payloads.len());

        for (index, payload) in payloads.iter().enumerate() {
            let path = dir.join(name.file_name(started, index));

            let outcome = match payload.decode() {
                Ok(bytes) => write_atomic(&path, &bytes).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Saved artifact");
                    written.push(path);
                }
                Err(e) if written.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        written = written.len(),
                        total = payloads.len(),
                        error = %e,
                        "Artifact batch partially written"
                    );
                    return Err(PipelineError::PartialWrite {
                        written,
                        failed_index: index,
                        total: payloads.len(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(written)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PipelineError::not_found(
                "file",
                &path.display().to_string(),
                Vec::<String>::new(),
            )),
            Err(e) => Err(PipelineError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_dir_and_decodes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("characters/casey/poses");
        let repo = FsArtifactRepository::new();
        let name = ArtifactName::timestamped("casey", Some("arms_crossed"), "png");

        let paths = repo
            .save(
                &dir,
                &name,
                &[Payload::encode(b"first"), Payload::encode(b"second")],
            )
            .await
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(tokio::fs::read(&paths[1]).await.unwrap(), b"second");
        let first = paths[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(first.starts_with("casey_arms_crossed_"));
        assert!(first.ends_with("_00.png"));
    }

    #[tokio::test]
    async fn test_save_is_idempotent_on_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new();
        let name = ArtifactName::single("01_casey_hook", "mp3");

        repo.save(tmp.path(), &name, &[Payload::Bytes(b"v1".to_vec())])
            .await
            .unwrap();
        let paths = repo
            .save(tmp.path(), &name, &[Payload::Bytes(b"v2".to_vec())])
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&paths[0]).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_bad_payload_after_good_one_is_partial_write() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new();
        let name = ArtifactName::numbered("fizz_design", "mp3");

        let err = repo
            .save(
                tmp.path(),
                &name,
                &[
                    Payload::encode(b"ok"),
                    Payload::Base64("%%% not base64 %%%".to_string()),
                    Payload::encode(b"never written"),
                ],
            )
            .await
            .unwrap_err();

        match err {
            PipelineError::PartialWrite {
                written,
                failed_index,
                total,
                ..
            } => {
                assert_eq!(written.len(), 1);
                assert_eq!(failed_index, 1);
                assert_eq!(total, 3);
                assert!(written[0].exists());
            }
            other => panic!("expected PartialWrite, got {other:?}"),
        }
        assert!(!tmp.path().join("fizz_design_2.mp3").exists());
    }

    #[tokio::test]
    async fn test_first_payload_failure_is_plain_error() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new();
        let name = ArtifactName::single("broken", "png");

        let err = repo
            .save(tmp.path(), &name, &[Payload::Base64("***".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(!tmp.path().join("broken.png").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new();
        let err = repo
            .read(&tmp.path().join("reference.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));
    }
}
