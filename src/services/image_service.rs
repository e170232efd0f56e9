use crate::{
    error::{ImageGenerationError, Result},
    models::image::{GeneratedImage, ImageEncoding, ImageModel, ImageOptions},
    services::{
        ai_service::{ImageData, ImageGenerationRequest, ModelClient},
        storage_service::StorageService,
    },
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::{info, instrument};

/// Where the bytes of one generated image come from
enum ImagePayload {
    Remote(String),
    Inline(String),
}

impl ImagePayload {
    /// The model's native payload wins when both are present; blank fields count as absent
    fn from_data(data: &ImageData, model: ImageModel) -> Option<Self> {
        let url = data.url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let b64 = data
            .b64_json
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (url, b64) {
            (Some(_), Some(b64)) if model.returns_inline_data() => {
                Some(Self::Inline(b64.to_string()))
            }
            (Some(url), _) => Some(Self::Remote(url.to_string())),
            (None, Some(b64)) => Some(Self::Inline(b64.to_string())),
            (None, None) => None,
        }
    }
}

/// Generates one illustration per call and writes it to the output directory
pub struct ImageGenerator {
    client: Arc<dyn ModelClient>,
    storage: StorageService,
}

impl ImageGenerator {
    pub fn new(client: Arc<dyn ModelClient>, storage: StorageService) -> Self {
        Self { client, storage }
    }

    #[instrument(skip(self, prompt, options), fields(model = options.model.as_str()))]
    pub async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<GeneratedImage> {
        let request = ImageGenerationRequest::from_options(prompt, options);
        let response = self.client.generate_image(&request).await?;

        let payload = response
            .data
            .first()
            .and_then(|data| ImagePayload::from_data(data, options.model))
            .ok_or_else(|| ImageGenerationError::NoImageData {
                model: options.model.as_str().to_string(),
            })?;

        let image = match payload {
            ImagePayload::Remote(url) => {
                info!("Downloading generated image from: {}", url);
                let bytes = self.client.download_image(&url).await?;
                let stored = self
                    .storage
                    .save_image(&bytes)
                    .await
                    .map_err(ImageGenerationError::from)?;

                GeneratedImage {
                    stored_path: stored.public_path,
                    encoding: ImageEncoding::Url,
                }
            }
            ImagePayload::Inline(encoded) => {
                let bytes = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(ImageGenerationError::from)?;
                let stored = self
                    .storage
                    .save_image(&bytes)
                    .await
                    .map_err(ImageGenerationError::from)?;
                self.storage
                    .save_sidecar(&stored, &encoded)
                    .await
                    .map_err(ImageGenerationError::from)?;

                GeneratedImage {
                    stored_path: stored.public_path,
                    encoding: ImageEncoding::Base64,
                }
            }
        };

        info!(
            "Generated image stored at {} ({:?})",
            image.stored_path, image.encoding
        );

        Ok(image)
    }
}
