//! Seed Repository Port
//!
//! Golden seeds worth reusing, one registry per character.

use async_trait::async_trait;

use crate::domain::{errors::PipelineError, Seed, SeedRegistry};

/// Repository interface for seed registries
///
/// Single-writer: implementations read, modify and rewrite the whole
/// registry without locking.
#[async_trait]
pub trait SeedRepository: Send + Sync {
    /// Registry for `character`, empty when none has been saved
    async fn load(&self, character: &str) -> Result<SeedRegistry, PipelineError>;

    /// Upsert `seed` with `description` and persist the full registry
    async fn save_seed(
        &self,
        character: &str,
        seed: Seed,
        description: &str,
    ) -> Result<SeedRegistry, PipelineError>;

    /// Characters that have a registry
    async fn characters(&self) -> Result<Vec<String>, PipelineError>;
}
