//! Seed Application Service (Use Case)

use std::sync::Arc;

use improv::{PipelineError, Seed, SeedRegistry, SeedRepository};

/// Application service for the golden-seed registry
pub struct SeedService<R: SeedRepository> {
    repo: Arc<R>,
}

impl<R: SeedRepository> SeedService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Record a seed worth reusing; the same seed again replaces its description
    pub async fn save(
        &self,
        character: &str,
        seed: Seed,
        description: &str,
    ) -> Result<SeedRegistry, PipelineError> {
        if seed.is_random() {
            return Err(PipelineError::Validation(
                "cannot save the random seed (-1)".to_string(),
            ));
        }
        if !seed.is_valid() {
            return Err(PipelineError::Validation(format!("invalid seed {}", seed.0)));
        }
        if character.trim().is_empty() {
            return Err(PipelineError::Validation("character is empty".to_string()));
        }
        self.repo.save_seed(character, seed, description.trim()).await
    }

    pub async fn get(&self, character: &str) -> Result<SeedRegistry, PipelineError> {
        self.repo.load(character).await
    }

    /// Every character with a registry, with its seeds
    pub async fn list_all(&self) -> Result<Vec<(String, SeedRegistry)>, PipelineError> {
        let characters = self.repo.characters().await?;
        let mut results = Vec::with_capacity(characters.len());

        for character in characters {
            let registry = self.repo.load(&character).await?;
            results.push((character, registry));
        }

        Ok(results)
    }
}
