//! Seed registry
//!
//! `<dir>/<character>_seeds.json`, rewritten whole on every save.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;

use improv::domain::sanitize_component;
use improv::{PipelineError, Seed, SeedRegistry, SeedRepository};

use super::{ensure_dir, write_atomic};

const SUFFIX: &str = "_seeds.json";

#[derive(Debug, Clone)]
pub struct FsSeedRepository {
    dir: PathBuf,
}

impl FsSeedRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, character: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", sanitize_component(character), SUFFIX))
    }
}

#[async_trait]
impl SeedRepository for FsSeedRepository {
    async fn load(&self, character: &str) -> Result<SeedRegistry, PipelineError> {
        let path = self.path_for(character);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PipelineError::Serialization(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SeedRegistry::new()),
            Err(e) => Err(PipelineError::io(&path, e)),
        }
    }

    async fn save_seed(
        &self,
        character: &str,
        seed: Seed,
        description: &str,
    ) -> Result<SeedRegistry, PipelineError> {
        let mut registry = self.load(character).await?;
        registry.upsert(seed, description, Local::now());

        ensure_dir(&self.dir).await?;
        let json = serde_json::to_string_pretty(&registry)?;
        write_atomic(&self.path_for(character), json.as_bytes()).await?;

        tracing::info!(character, %seed, description, "Saved seed");
        Ok(registry)
    }

    async fn characters(&self) -> Result<Vec<String>, PipelineError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PipelineError::io(&self.dir, e)),
        };

        let mut characters = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(&self.dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(character) = name.strip_suffix(SUFFIX) {
                characters.push(character.to_string());
            }
        }

        characters.sort();
        Ok(characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resave_overwrites_description() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsSeedRepository::new(tmp.path().join("seeds"));

        repo.save_seed("casey", Seed(12345), "hook pose").await.unwrap();
        repo.save_seed("casey", Seed(12345), "final pick").await.unwrap();

        let registry = repo.load("casey").await.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(Seed(12345)).unwrap().description, "final pick");

        let raw: serde_json::Value = serde_json::from_str(
            &tokio::fs::read_to_string(repo.path_for("casey")).await.unwrap(),
        )
        .unwrap();
        assert_eq!(raw["12345"]["description"], "final pick");
    }

    #[tokio::test]
    async fn test_other_entries_survive() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsSeedRepository::new(tmp.path());

        repo.save_seed("mira", Seed(1), "gasp").await.unwrap();
        repo.save_seed("mira", Seed(2), "sigh").await.unwrap();
        repo.save_seed("mira", Seed(1), "bigger gasp").await.unwrap();

        let registry = repo.load("mira").await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(Seed(2)).unwrap().description, "sigh");
    }

    #[tokio::test]
    async fn test_missing_registry_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsSeedRepository::new(tmp.path().join("nope"));
        assert!(repo.load("dot").await.unwrap().is_empty());
        assert!(repo.characters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_characters_lists_registries() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsSeedRepository::new(tmp.path());
        repo.save_seed("rex", Seed(3), "stare").await.unwrap();
        repo.save_seed("byte", Seed(4), "glitch").await.unwrap();

        assert_eq!(repo.characters().await.unwrap(), vec!["byte", "rex"]);
    }
}
