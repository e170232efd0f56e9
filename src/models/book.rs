use serde::{Deserialize, Serialize};
use validator::Validate;

use super::image::{ImageEncoding, ImageOptions};

/// One narrative unit of the story, selected for illustration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    /// 1-based position in the story
    pub index: u32,
    pub text: String,
}

/// A scene paired with its illustration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPage {
    pub image_path: String,
    pub image_type: ImageEncoding,
    pub text: String,
}

/// Generate Book Request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBookRequest {
    /// Kept optional so a missing story gets our own 400 message
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default = "default_style")]
    #[validate(length(min = 1, max = 50))]
    pub style: String,
    #[serde(default = "default_max_images")]
    #[validate(range(min = 1))]
    pub max_images: u32,
    #[serde(default)]
    #[validate(nested)]
    pub image_options: ImageOptions,
}

fn default_style() -> String {
    "storybook".to_string()
}

fn default_max_images() -> u32 {
    5
}

/// Generate Book Response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBookResponse {
    pub success: bool,
    pub pages: Vec<BookPage>,
    pub total_pages: usize,
}

impl GenerateBookResponse {
    pub fn new(pages: Vec<BookPage>) -> Self {
        Self {
            success: true,
            total_pages: pages.len(),
            pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub styles: Vec<StyleEntry>,
}

#[derive(Debug, Serialize)]
pub struct StyleEntry {
    pub id: String,
    pub descriptor: String,
}
