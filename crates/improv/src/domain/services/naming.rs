//! Artifact naming convention engine.
//!
//! Generates deterministic filenames for generated images and audio.

use chrono::{DateTime, Local};

/// Second-resolution timestamp embedded in generated filenames
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How files produced by one save call are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactName {
    /// `{subject}_{variant}_{timestamp}_{NN}.{ext}`; variant omitted when `None`
    Timestamped {
        subject: String,
        variant: Option<String>,
        extension: String,
    },
    /// `{stem}.{ext}`, overwritten on regeneration
    Single { stem: String, extension: String },
    /// `{stem}_{i}.{ext}`
    Numbered { stem: String, extension: String },
}

impl ArtifactName {
    pub fn timestamped(
        subject: impl Into<String>,
        variant: Option<&str>,
        extension: impl Into<String>,
    ) -> Self {
        Self::Timestamped {
            subject: subject.into(),
            variant: variant.map(str::to_string),
            extension: extension.into(),
        }
    }

    pub fn single(stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::Single {
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    pub fn numbered(stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::Numbered {
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    /// File name of payload `index` for a save that started at `at`
    pub fn file_name(&self, at: DateTime<Local>, index: usize) -> String {
        match self {
            Self::Timestamped {
                subject,
                variant,
                extension,
            } => artifact_filename(
                subject,
                variant.as_deref(),
                &at.format(TIMESTAMP_FORMAT).to_string(),
                index,
                extension,
            ),
            Self::Single { stem, extension } => {
                format!("{}.{}", sanitize_component(stem), extension)
            }
            Self::Numbered { stem, extension } => {
                format!("{}_{}.{}", sanitize_component(stem), index, extension)
            }
        }
    }
}

/// Generate a timestamped artifact filename.
///
/// # Examples
///
/// ```
/// use improv::domain::services::artifact_filename;
///
/// assert_eq!(
///     artifact_filename("casey", Some("standing_neutral"), "20250101_093000", 0, "png"),
///     "casey_standing_neutral_20250101_093000_00.png"
/// );
/// assert_eq!(
///     artifact_filename("shot03_rex_deadpan", None, "20250101_093000", 2, "png"),
///     "shot03_rex_deadpan_20250101_093000_02.png"
/// );
/// ```
pub fn artifact_filename(
    subject: &str,
    variant: Option<&str>,
    timestamp: &str,
    index: usize,
    extension: &str,
) -> String {
    let mut name = sanitize_component(subject);

    if let Some(variant) = variant.filter(|v| !v.trim().is_empty()) {
        name.push('_');
        name.push_str(&sanitize_component(variant));
    }

    name.push('_');
    name.push_str(timestamp);
    name.push_str(&format!("_{:02}.{}", index, extension));
    name
}

/// Keep a name component to `[A-Za-z0-9._-]`; anything else becomes `_`
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // No hidden files or parent-directory hops
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
