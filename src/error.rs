use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures turning the model's segmentation reply into scenes
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("Error parsing scene JSON: {source}\nLLM output:\n{raw}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("Unrecognized scene JSON shape\nLLM output:\n{raw}")]
    UnrecognizedShape { raw: String },

    #[error("Scene {position} has no text\nLLM output:\n{raw}")]
    InvalidScene { position: usize, raw: String },

    #[error("Scene {position} is shorter than {min_chars} characters\nLLM output:\n{raw}")]
    SceneTooShort {
        position: usize,
        min_chars: usize,
        raw: String,
    },

    #[error("Model returned no scenes\nLLM output:\n{raw}")]
    NoScenes { raw: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Scene {0} has empty text")]
    EmptyScene(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum ImageGenerationError {
    #[error("No image data returned from API (model {model})")]
    NoImageData { model: String },

    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to store image: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Cannot compose {scenes} scenes with {images} images")]
    LengthMismatch { scenes: usize, images: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    ImageGeneration(#[from] ImageGenerationError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("AI provider error: {0}")]
    AIProvider(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::BadRequest(ref msg) => {
                tracing::warn!("Rejected request: {}", msg);
            }
            ApiError::Segmentation(ref e) => {
                tracing::error!("Segmentation error: {}", e);
            }
            ApiError::Prompt(ref e) => {
                tracing::error!("Prompt error: {}", e);
            }
            ApiError::ImageGeneration(ref e) => {
                tracing::error!("Image generation error: {:?}", e);
            }
            ApiError::Compose(ref e) => {
                tracing::error!("Compose error: {}", e);
            }
            ApiError::AIProvider(ref msg) => {
                tracing::error!("AI provider error: {}", msg);
            }
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
            }
        }

        let body = json!({ "error": self.to_string() });

        (status, Json(body)).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;
