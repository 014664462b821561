//! Artifact Repository Port
//!
//! Persists generated payloads as files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{errors::PipelineError, ArtifactName, Payload};

/// Repository interface for generated files
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Decode and write each payload into `dir`, creating it if needed
    ///
    /// Each payload is written whole or not at all. When a later payload
    /// fails after earlier ones landed, the error is
    /// [`PipelineError::PartialWrite`] listing the files kept on disk.
    async fn save(
        &self,
        dir: &Path,
        name: &ArtifactName,
        payloads: &[Payload],
    ) -> Result<Vec<PathBuf>, PipelineError>;

    /// Read a file, typically an img2img reference
    async fn read(&self, path: &Path) -> Result<Vec<u8>, PipelineError>;
}
