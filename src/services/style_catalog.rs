use crate::models::book::StyleEntry;

/// Fixed, ordered mapping from style id to the descriptor used in prompts
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    presets: Vec<(String, String)>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::new([
            (
                "storybook",
                "whimsical storybook illustration, soft pastel colors, ink outlines, flat shading",
            ),
            (
                "watercolor",
                "delicate watercolor painting, vibrant washes, subtle gradients, paper texture",
            ),
            (
                "manga",
                "black-and-white manga panel, dynamic lines, screentone shading, cinematic angle",
            ),
            (
                "pixel",
                "retro pixel-art, 32x32 style, limited color palette, crisp pixels",
            ),
            (
                "lowpoly",
                "low-poly 3D render, bright low-count polygons, minimal details, isometric view",
            ),
            (
                "realistic",
                "hyper-realistic digital art, cinematic lighting, 50mm lens, detailed textures",
            ),
        ])
    }
}

impl StyleCatalog {
    pub fn new<I, K, D>(presets: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        Self {
            presets: presets
                .into_iter()
                .map(|(key, descriptor)| (key.into(), descriptor.into()))
                .collect(),
        }
    }

    pub fn descriptor(&self, key: &str) -> Option<&str> {
        self.presets
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, descriptor)| descriptor.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.descriptor(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> Vec<StyleEntry> {
        self.presets
            .iter()
            .map(|(id, descriptor)| StyleEntry {
                id: id.clone(),
                descriptor: descriptor.clone(),
            })
            .collect()
    }

    /// Message shown when a caller asks for a style we do not have
    pub fn invalid_style_message(&self) -> String {
        format!(
            "Invalid style. Options: {}",
            self.keys().collect::<Vec<_>>().join(", ")
        )
    }
}
