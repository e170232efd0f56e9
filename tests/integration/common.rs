use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};
use storybook_illustrator::{
    config::{Config, OpenAIConfig, OutputConfig, PipelineConfig, ServerConfig},
    error::{ApiError, ImageGenerationError, Result},
    routes::create_router,
    services::{
        ai_service::{ImageData, ImageGenerationRequest, ImageGenerationResponse},
        ModelClient, StyleCatalog,
    },
    AppState,
};
use tower::ServiceExt;

// 1x1 transparent PNG
pub const PIXEL_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

pub const DOWNLOADED_BYTES: &[u8] = b"\x89PNG fake downloaded image";

/// Model client answering from a script and recording what it was asked
pub struct FakeModelClient {
    segmentation_reply: String,
    image_data: ImageData,
    image_delay: Duration,
    pub chat_calls: Mutex<Vec<(String, String)>>,
    pub image_requests: Mutex<Vec<ImageGenerationRequest>>,
}

impl FakeModelClient {
    pub fn new(segmentation_reply: impl Into<String>, image_data: ImageData) -> Self {
        Self {
            segmentation_reply: segmentation_reply.into(),
            image_data,
            image_delay: Duration::ZERO,
            chat_calls: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    /// Image API answers with a URL (dall-e style)
    pub fn with_url_images(segmentation_reply: impl Into<String>) -> Self {
        Self::new(
            segmentation_reply,
            ImageData {
                url: Some("https://images.example.com/generated.png".to_string()),
                b64_json: None,
            },
        )
    }

    /// Image API answers with inline base64 (gpt-image-1 style)
    pub fn with_inline_images(segmentation_reply: impl Into<String>) -> Self {
        Self::new(
            segmentation_reply,
            ImageData {
                url: None,
                b64_json: Some(PIXEL_PNG_B64.to_string()),
            },
        )
    }

    /// Each image call takes `delay` before answering
    pub fn with_image_delay(mut self, delay: Duration) -> Self {
        self.image_delay = delay;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.image_requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn chat_call_count(&self) -> usize {
        self.chat_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for FakeModelClient {
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        Ok(self.segmentation_reply.clone())
    }

    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        self.image_requests.lock().unwrap().push(request.clone());
        if !self.image_delay.is_zero() {
            tokio::time::sleep(self.image_delay).await;
        }
        Ok(ImageGenerationResponse {
            data: vec![self.image_data.clone()],
        })
    }

    async fn download_image(
        &self,
        _url: &str,
    ) -> std::result::Result<Vec<u8>, ImageGenerationError> {
        Ok(DOWNLOADED_BYTES.to_vec())
    }
}

/// Model client whose chat endpoint is down
pub struct UnavailableModelClient;

#[async_trait]
impl ModelClient for UnavailableModelClient {
    async fn complete_json(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(ApiError::AIProvider(
            "OpenAI chat error 503: upstream unavailable".to_string(),
        ))
    }

    async fn generate_image(
        &self,
        _request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        Ok(ImageGenerationResponse::default())
    }

    async fn download_image(
        &self,
        _url: &str,
    ) -> std::result::Result<Vec<u8>, ImageGenerationError> {
        Err(ImageGenerationError::Download("unreachable".to_string()))
    }
}

/// Build a test `Config` writing images under `output_dir`
pub fn test_config(output_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        openai: OpenAIConfig {
            api_key: "sk-test".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            text_model: "gpt-4.1".to_string(),
            request_timeout_ms: 1_000,
            connect_timeout_secs: 1,
        },
        output: OutputConfig {
            dir: output_dir.to_path_buf(),
            public_prefix: "/output".to_string(),
        },
        pipeline: PipelineConfig {
            max_prompt_chars: 350,
            min_scene_chars: 2,
            max_images_limit: 10,
        },
    }
}

pub fn build_test_app(output_dir: &Path, client: Arc<dyn ModelClient>) -> Router {
    let state = AppState::with_client(test_config(output_dir), client, StyleCatalog::default());
    create_router(state)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Segmentation reply with `n` scenes wrapped in `{"scenes": [...]}`
pub fn scenes_reply(n: usize) -> String {
    let scenes: Vec<Value> = (1..=n)
        .map(|i| serde_json::json!({"index": i, "text": format!("Scene number {i} of the story.")}))
        .collect();
    serde_json::json!({ "scenes": scenes }).to_string()
}
