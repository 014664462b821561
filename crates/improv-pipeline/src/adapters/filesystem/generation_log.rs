//! Generation log
//!
//! One JSON record per line in `<dir>/<character>_generations.jsonl`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use improv::domain::sanitize_component;
use improv::{GenerationLogEntry, GenerationLogRepository, PipelineError};

use super::ensure_dir;

#[derive(Debug, Clone)]
pub struct FsGenerationLog {
    dir: PathBuf,
}

impl FsGenerationLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, character: &str) -> PathBuf {
        self.dir
            .join(format!("{}_generations.jsonl", sanitize_component(character)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl GenerationLogRepository for FsGenerationLog {
    async fn append(&self, entry: &GenerationLogEntry) -> Result<(), PipelineError> {
        ensure_dir(&self.dir).await?;

        // Serialize first: a failure here must not leave a stub line behind
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let path = self.path_for(&entry.character);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PipelineError::io(&path, e))?;
        file.flush().await.map_err(|e| PipelineError::io(&path, e))?;

        tracing::debug!(character = %entry.character, id = %entry.id, "Logged generation");
        Ok(())
    }

    async fn entries(&self, character: &str) -> Result<Vec<GenerationLogEntry>, PipelineError> {
        let path = self.path_for(character);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PipelineError::io(&path, e)),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    PipelineError::Serialization(format!("{}:{}: {}", path.display(), n + 1, e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use improv::{GenerationMode, ImageSettings, SettingsSnapshot};

    fn entry(character: &str, prompt: &str) -> GenerationLogEntry {
        GenerationLogEntry::new(
            character,
            prompt,
            SettingsSnapshot::Image {
                mode: GenerationMode::Txt2Img,
                negative_prompt: String::new(),
                settings: ImageSettings::shot(),
            },
            Some(1),
            vec![PathBuf::from(format!("{prompt}.png"))],
        )
    }

    #[tokio::test]
    async fn test_append_is_monotonic() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FsGenerationLog::new(tmp.path().join("logs"));

        for n in 0..5 {
            log.append(&entry("rex", &format!("take {n}"))).await.unwrap();
        }

        let entries = log.entries("rex").await.unwrap();
        assert_eq!(entries.len(), 5);
        let prompts: Vec<_> = entries.iter().map(|e| e.prompt.as_str()).collect();
        assert_eq!(prompts, ["take 0", "take 1", "take 2", "take 3", "take 4"]);

        let raw = tokio::fs::read_to_string(log.path_for("rex")).await.unwrap();
        assert_eq!(raw.lines().count(), 5);
        for line in raw.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[tokio::test]
    async fn test_logs_are_per_character() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FsGenerationLog::new(tmp.path());

        log.append(&entry("casey", "a")).await.unwrap();
        log.append(&entry("fizz", "b")).await.unwrap();

        assert_eq!(log.entries("casey").await.unwrap().len(), 1);
        assert_eq!(log.entries("fizz").await.unwrap().len(), 1);
        assert!(log.entries("dot").await.unwrap().is_empty());
        assert!(tmp.path().join("casey_generations.jsonl").exists());
    }
}
