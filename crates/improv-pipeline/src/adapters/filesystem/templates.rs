//! Character template loader
//!
//! `pipeline/prompts/<id>.json` wins over the embedded roster entry of the
//! same id. A roster character without a file falls back to the embedded
//! template and is reported in [`TemplateLoad::fallbacks`]. A file that
//! exists but does not parse is an error, never a silent fallback.

use std::collections::BTreeMap;
use std::path::Path;

use improv::{CharacterTemplate, PipelineError, TemplateStore};

/// Result of loading templates from disk
#[derive(Debug, Clone)]
pub struct TemplateLoad {
    pub store: TemplateStore,
    /// Ids served from the embedded roster because no file was found
    pub fallbacks: Vec<String>,
}

/// Build the template store from `prompts_dir` and the embedded roster
///
/// `base_prompt` and `style` fill blank fragments of any template.
pub async fn load_templates(
    prompts_dir: &Path,
    embedded: &[CharacterTemplate],
    base_prompt: &str,
    style: &str,
) -> Result<TemplateLoad, PipelineError> {
    let mut templates: BTreeMap<String, CharacterTemplate> = read_prompt_files(prompts_dir)
        .await?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

    let mut fallbacks = Vec::new();
    for template in embedded {
        if templates.contains_key(&template.id) {
            continue;
        }
        tracing::warn!(
            character = %template.id,
            dir = %prompts_dir.display(),
            "No prompt file found, using embedded template"
        );
        fallbacks.push(template.id.clone());
        templates.insert(template.id.clone(), template.clone());
    }

    let store = TemplateStore::new(
        templates
            .into_values()
            .map(|t| t.with_style_defaults(base_prompt, style)),
    );

    Ok(TemplateLoad { store, fallbacks })
}

async fn read_prompt_files(dir: &Path) -> Result<Vec<CharacterTemplate>, PipelineError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PipelineError::io(dir, e)),
    };

    let mut templates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::io(dir, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;
        let mut template: CharacterTemplate = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Serialization(format!("{}: {}", path.display(), e)))?;

        // The file name is the lookup key
        template.id = stem.to_string();
        tracing::debug!(character = stem, "Loaded prompt file");
        templates.push(template);
    }

    Ok(templates)
}
