use crate::{error::PromptError, models::book::Scene, services::style_catalog::StyleCatalog};

pub const FRAMING_CLAUSE: &str = "Illustration for a children's story, square composition.";

/// Appended to every prompt after the first so consecutive pages stay coherent
pub const CONTINUITY_CLAUSE: &str =
    " Maintain the same characters, color palette and environment consistency as the previous page.";

/// Builds one image prompt per scene
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    catalog: StyleCatalog,
    max_scene_chars: usize,
}

impl PromptBuilder {
    pub fn new(catalog: StyleCatalog, max_scene_chars: usize) -> Self {
        Self {
            catalog,
            max_scene_chars,
        }
    }

    pub fn build_prompts(
        &self,
        scenes: &[Scene],
        style_key: &str,
    ) -> Result<Vec<String>, PromptError> {
        let style_words = self
            .catalog
            .descriptor(style_key)
            .ok_or_else(|| PromptError::UnknownStyle(style_key.to_string()))?;

        scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let text = scene.text.trim();
                if text.is_empty() {
                    return Err(PromptError::EmptyScene(scene.index));
                }

                let continuity = if i > 0 { CONTINUITY_CLAUSE } else { "" };

                Ok(format!(
                    "{style_words}. {FRAMING_CLAUSE} Scene {}: {}{continuity}",
                    i + 1,
                    truncate_chars(text, self.max_scene_chars),
                ))
            })
            .collect()
    }
}

/// Cut to at most `max_chars` characters without splitting a code point
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
