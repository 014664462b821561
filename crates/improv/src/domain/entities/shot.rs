//! ShotSpec - One planned image unit of an episode

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Shot specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotSpec {
    pub id: String,
    pub character: String,
    pub expression: String,
    pub pose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl ShotSpec {
    pub fn new(
        id: impl Into<String>,
        character: impl Into<String>,
        expression: impl Into<String>,
        pose: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            character: character.into(),
            expression: expression.into(),
            pose: pose.into(),
            action: None,
            output_dir: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Free-form fragments appended after the expression
    pub fn extra_fragments(&self) -> Vec<String> {
        self.action.iter().cloned().collect()
    }
}
