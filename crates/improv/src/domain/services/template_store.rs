//! Template Store
//!
//! Immutable lookup table of character templates, built once at startup.

use std::collections::BTreeMap;

use crate::domain::entities::CharacterTemplate;
use crate::domain::errors::PipelineError;

#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, CharacterTemplate>,
}

impl TemplateStore {
    /// Later templates with the same id replace earlier ones
    pub fn new(templates: impl IntoIterator<Item = CharacterTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|t| (t.id.clone(), t))
                .collect(),
        }
    }

    /// Exact-key lookup
    pub fn get_character(&self, id: &str) -> Result<&CharacterTemplate, PipelineError> {
        self.templates
            .get(id)
            .ok_or_else(|| PipelineError::not_found("character", id, self.ids()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
