//! GenerationMode - How an image request is seeded

use serde::{Deserialize, Serialize};

/// Image generation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Generate from the prompt alone
    #[default]
    Txt2Img,
    /// Generate a variation of a reference image
    Img2Img,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Txt2Img => write!(f, "txt2img"),
            GenerationMode::Img2Img => write!(f, "img2img"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt2img" | "text" => Ok(GenerationMode::Txt2Img),
            "img2img" | "variation" => Ok(GenerationMode::Img2Img),
            _ => Err(format!("Unknown generation mode: {}. Valid: txt2img, img2img", s)),
        }
    }
}
