use crate::{
    config::OpenAIConfig,
    error::{ApiError, ImageGenerationError, Result},
    models::image::{ImageModel, ImageOptions},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

/// The provider calls the pipeline depends on
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Chat completion in JSON mode; returns the first choice's content
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse>;

    async fn download_image(
        &self,
        url: &str,
    ) -> std::result::Result<Vec<u8>, ImageGenerationError>;
}

/// Body of `POST /images/generations`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u8,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_compression: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl ImageGenerationRequest {
    /// Build the request body, keeping only the options the model accepts
    pub fn from_options(prompt: &str, options: &ImageOptions) -> Self {
        let mut request = Self {
            model: options.model.as_str().to_string(),
            prompt: prompt.to_string(),
            n: 1,
            size: options.size.clone(),
            style: None,
            quality: None,
            response_format: None,
            background: None,
            moderation: None,
            output_compression: None,
            output_format: None,
        };

        match options.model {
            ImageModel::DallE2 => {
                request.response_format = Some("url".to_string());
            }
            ImageModel::DallE3 => {
                request.style = Some(options.style.clone());
                request.quality = Some(options.quality.clone());
                request.response_format = Some("url".to_string());
            }
            ImageModel::GptImage1 => {
                request.quality = Some(options.quality.clone());
                request.background = Some(options.background.clone());
                request.moderation = Some(options.moderation.clone());
                request.output_compression = Some(options.output_compression);
                request.output_format = Some(options.output_format.clone());
            }
        }

        request
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI REST client for chat completions and image generation
pub struct AIService {
    config: OpenAIConfig,
    http_client: reqwest::Client,
}

impl AIService {
    pub fn new(config: &OpenAIConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ModelClient for AIService {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.config.text_model))]
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.config.text_model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let response = self
            .http_client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::AIProvider(format!("OpenAI chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::AIProvider(format!(
                "OpenAI chat error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AIProvider(format!("Failed to parse chat response: {}", e)))?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::AIProvider("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        info!(
            "AI vendor chat raw response: {}",
            content.chars().take(300).collect::<String>()
        );

        Ok(content.trim().to_string())
    }

    #[instrument(skip(self, request), fields(model = %request.model, size = %request.size))]
    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        info!("Generating image: prompt_len={}", request.prompt.len());

        let response = self
            .http_client
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::AIProvider(format!("OpenAI image request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::AIProvider(format!(
                "OpenAI image API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let image_response: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AIProvider(format!("Failed to parse image response: {}", e)))?;

        info!(
            "OpenAI image response: {} images returned",
            image_response.data.len()
        );

        Ok(image_response)
    }

    #[instrument(skip(self))]
    async fn download_image(
        &self,
        url: &str,
    ) -> std::result::Result<Vec<u8>, ImageGenerationError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageGenerationError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageGenerationError::Download(format!(
                "status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageGenerationError::Download(e.to_string()))?;

        info!("Downloaded image: {} bytes", bytes.len());

        Ok(bytes.to_vec())
    }
}
