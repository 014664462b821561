//! Generation Log Repository Port
//!
//! Append-only record of every generation, one stream per character.

use async_trait::async_trait;

use crate::domain::{errors::PipelineError, GenerationLogEntry};

#[async_trait]
pub trait GenerationLogRepository: Send + Sync {
    /// Append one entry to `entry.character`'s log; prior entries are never touched
    async fn append(&self, entry: &GenerationLogEntry) -> Result<(), PipelineError>;

    /// All entries for a character in append order
    async fn entries(&self, character: &str) -> Result<Vec<GenerationLogEntry>, PipelineError>;
}
