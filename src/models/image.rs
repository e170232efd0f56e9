use serde::{Deserialize, Serialize};
use validator::Validate;

/// Image generation model family
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageModel {
    #[default]
    #[serde(rename = "dall-e-2")]
    DallE2,
    #[serde(rename = "dall-e-3")]
    DallE3,
    #[serde(rename = "gpt-image-1")]
    GptImage1,
}

impl ImageModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DallE2 => "dall-e-2",
            Self::DallE3 => "dall-e-3",
            Self::GptImage1 => "gpt-image-1",
        }
    }

    /// gpt-image-1 always answers with inline base64 instead of a URL
    pub fn returns_inline_data(&self) -> bool {
        matches!(self, Self::GptImage1)
    }
}

/// Per-request image options; fields a model does not understand are not sent
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ImageOptions {
    #[serde(default)]
    pub model: ImageModel,
    #[serde(default = "default_size")]
    #[validate(length(min = 3, max = 20))]
    pub size: String,
    #[serde(default = "default_style")]
    #[validate(length(min = 1, max = 20))]
    pub style: String,
    #[serde(default = "default_quality")]
    #[validate(length(min = 1, max = 20))]
    pub quality: String,
    #[serde(default = "default_auto")]
    #[validate(length(min = 1, max = 20))]
    pub background: String,
    #[serde(default = "default_auto")]
    #[validate(length(min = 1, max = 20))]
    pub moderation: String,
    #[serde(default = "default_output_compression")]
    #[validate(range(max = 100))]
    pub output_compression: u8,
    #[serde(default = "default_output_format")]
    #[validate(length(min = 1, max = 10))]
    pub output_format: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            model: ImageModel::default(),
            size: default_size(),
            style: default_style(),
            quality: default_quality(),
            background: default_auto(),
            moderation: default_auto(),
            output_compression: default_output_compression(),
            output_format: default_output_format(),
        }
    }
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_style() -> String {
    "vivid".to_string()
}

fn default_quality() -> String {
    "standard".to_string()
}

fn default_auto() -> String {
    "auto".to_string()
}

fn default_output_compression() -> u8 {
    100
}

fn default_output_format() -> String {
    "png".to_string()
}

/// How the image payload reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Downloaded from a provider URL
    Url,
    /// Decoded from inline base64; a `.b64` sidecar sits next to the file
    Base64,
}

/// An image persisted to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Public path, e.g. `/output/<uuid>.png`
    pub stored_path: String,
    pub encoding: ImageEncoding,
}
