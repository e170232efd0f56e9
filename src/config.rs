use serde::Deserialize;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory generated images are written to
    pub dir: PathBuf,
    /// URL prefix the directory is served under
    pub public_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_prompt_chars: usize,
    pub min_scene_chars: usize,
    pub max_images_limit: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("openai.api_base", "https://api.openai.com/v1")?
            .set_default("openai.text_model", "gpt-4.1")?
            .set_default("openai.request_timeout_ms", 180_000)?
            .set_default("openai.connect_timeout_secs", 10)?
            .set_default("output.dir", "public/output")?
            .set_default("output.public_prefix", "/output")?
            .set_default("pipeline.max_prompt_chars", 350)?
            .set_default("pipeline.min_scene_chars", 2)?
            .set_default("pipeline.max_images_limit", 100)?
            // Optional config.yml / config.toml next to the binary
            .add_source(config::File::with_name("config").required(false))
            // Allow environment variables to override config file
            .add_source(
                config::Environment::with_prefix("STORYBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        if config.openai.api_key.trim().is_empty() {
            config.openai.api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        }
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.openai.api_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "OpenAI API key missing: set OPENAI_API_KEY (or STORYBOOK__OPENAI__API_KEY)"
                    .to_string(),
            ));
        }
        if self.pipeline.max_images_limit == 0 {
            return Err(config::ConfigError::Message(
                "pipeline.max_images_limit must be at least 1".to_string(),
            ));
        }
        let prefix = self.output.public_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') {
            return Err(config::ConfigError::Message(format!(
                "output.public_prefix must be a non-root path starting with '/': {}",
                self.output.public_prefix
            )));
        }
        Ok(())
    }
}
