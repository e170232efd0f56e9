use crate::{
    config::Config,
    services::{AIService, ModelClient, StorageService, StoryPipeline, StyleCatalog},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StoryPipeline>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let ai_service: Arc<dyn ModelClient> = Arc::new(AIService::new(&config.openai)?);
        Ok(Self::with_client(config, ai_service, StyleCatalog::default()))
    }

    /// Build the state around any model client (tests pass a fake one)
    pub fn with_client(
        config: Config,
        client: Arc<dyn ModelClient>,
        catalog: StyleCatalog,
    ) -> Self {
        let storage = StorageService::new(&config.output);
        let pipeline = Arc::new(StoryPipeline::new(
            client,
            catalog,
            storage,
            &config.pipeline,
        ));

        Self {
            pipeline,
            config: Arc::new(config),
        }
    }
}
