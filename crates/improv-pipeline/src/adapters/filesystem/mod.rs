//! Filesystem Adapters
//!
//! Local-disk implementations of the repository ports plus the
//! character template loader.

mod artifacts;
mod generation_log;
mod seeds;
mod templates;

pub use artifacts::FsArtifactRepository;
pub use generation_log::FsGenerationLog;
pub use seeds::FsSeedRepository;
pub use templates::{load_templates, TemplateLoad};

use std::path::{Path, PathBuf};

use improv::PipelineError;

/// Write `bytes` to `path` via a sibling temp file and a rename, so the
/// target either keeps its old content or holds the complete new one.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let tmp = temp_path(path);

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(PipelineError::io(&tmp, e));
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(PipelineError::io(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

pub(crate) async fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipelineError::io(dir, e))
}
