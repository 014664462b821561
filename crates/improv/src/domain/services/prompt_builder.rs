//! Prompt Builder
//!
//! Composes character fragments into the prompt sent to the image
//! service. Everything here is pure: no I/O, no randomness.

use crate::domain::entities::CharacterTemplate;

pub const PROMPT_SEPARATOR: &str = ", ";

/// Negative prompt for character assets
pub const DEFAULT_NEGATIVE_PROMPT: &str = "photorealistic, hyperrealistic, photograph, real human, anime, 2d, flat, \
cartoon, sketch, painting, watercolor, blurry, low quality, bad anatomy, \
extra fingers, mutated hands, poorly drawn face, distorted face, ugly, \
duplicate, morbid, dark, gritty, horror, scary, nsfw, nude, text, \
watermark, signature, logo, multiple characters, crowd";

/// Negative prompt for medium shots; also keeps legs and feet out of frame
pub const SHOT_NEGATIVE_PROMPT: &str = "photorealistic, hyperrealistic, photograph, real human, anime, 2d, flat, \
cartoon, sketch, painting, watercolor, blurry, low quality, bad anatomy, \
extra fingers, mutated hands, poorly drawn face, distorted face, ugly, \
duplicate, morbid, dark, gritty, horror, scary, nsfw, nude, text, \
watermark, signature, logo, multiple characters, crowd, full body, \
legs visible, feet visible";

/// Builds prompts in a fixed fragment order:
/// style base, framing, identity, outfit, pose, expression, extras, style quality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptBuilder {
    framing: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera framing inserted right after the style base
    pub fn with_framing(mut self, framing: impl Into<String>) -> Self {
        self.framing = Some(framing.into());
        self
    }

    pub fn build<S: AsRef<str>>(
        &self,
        character: &CharacterTemplate,
        expression_key: &str,
        pose_key: &str,
        extra_fragments: &[S],
    ) -> String {
        let head = [
            character.base_prompt.as_str(),
            self.framing.as_deref().unwrap_or(""),
            character.identity.as_str(),
            character.outfit.as_str(),
            character.pose(pose_key),
            character.expression(expression_key),
        ];

        join_fragments(
            head.into_iter()
                .chain(extra_fragments.iter().map(|f| f.as_ref()))
                .chain(std::iter::once(character.style.as_str())),
        )
    }
}

/// Build a prompt without framing
pub fn build_prompt<S: AsRef<str>>(
    character: &CharacterTemplate,
    expression_key: &str,
    pose_key: &str,
    extra_fragments: &[S],
) -> String {
    PromptBuilder::new().build(character, expression_key, pose_key, extra_fragments)
}

/// Join fragments with [`PROMPT_SEPARATOR`], dropping blank ones
///
/// Surrounding whitespace and stray commas are trimmed from each fragment
/// so the result never contains doubled or dangling separators.
pub fn join_fragments<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    fragments
        .into_iter()
        .map(|f| f.trim_matches(|c: char| c.is_whitespace() || c == ','))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(PROMPT_SEPARATOR)
}

/// Negative prompt precedence: caller input, then character default, then `fallback`
pub fn resolve_negative_prompt(
    custom: Option<&str>,
    character: Option<&CharacterTemplate>,
    fallback: &str,
) -> String {
    custom
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            character
                .and_then(|c| c.negative_prompt.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(fallback)
        .to_string()
}
