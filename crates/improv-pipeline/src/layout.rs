//! Project layout on disk

use std::path::{Path, PathBuf};

use improv::domain::sanitize_component;

/// Resolves every pipeline path below one project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn character_dir(&self, character: &str) -> PathBuf {
        self.root
            .join("characters")
            .join(sanitize_component(character))
    }

    pub fn poses_dir(&self, character: &str) -> PathBuf {
        self.character_dir(character).join("poses")
    }

    /// Default img2img reference
    pub fn reference_image(&self, character: &str) -> PathBuf {
        self.character_dir(character).join("reference.png")
    }

    pub fn episode_dir(&self, episode: &str) -> PathBuf {
        self.root.join("episodes").join(sanitize_component(episode))
    }

    pub fn shots_dir(&self, episode: &str) -> PathBuf {
        self.episode_dir(episode).join("shots")
    }

    pub fn audio_dir(&self, episode: &str) -> PathBuf {
        self.episode_dir(episode).join("audio")
    }

    pub fn voice_designs_dir(&self, episode: &str, character: &str) -> PathBuf {
        self.audio_dir(episode)
            .join("voice_designs")
            .join(sanitize_component(character))
    }

    pub fn voice_tests_dir(&self, episode: &str) -> PathBuf {
        self.audio_dir(episode).join("voice_tests")
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join("pipeline").join("prompts")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("pipeline").join("logs")
    }

    pub fn seeds_dir(&self) -> PathBuf {
        self.root.join("pipeline").join("seeds")
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(".env")
    }
}
