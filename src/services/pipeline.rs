use crate::{
    config::PipelineConfig,
    error::{ApiError, PromptError, Result},
    models::{book::BookPage, image::ImageOptions},
    services::{
        ai_service::ModelClient, composer, image_service::ImageGenerator,
        prompt_builder::PromptBuilder, segmenter::SceneSegmenter, storage_service::StorageService,
        style_catalog::StyleCatalog,
    },
};
use std::{fmt, sync::Arc, time::Instant};
use tracing::{error, info, instrument};

/// Where a run currently is; runs never resume, a failed run starts over from `Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Segmenting,
    Prompting,
    Generating { current: usize, total: usize },
    Composing,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Segmenting => write!(f, "segmenting"),
            Self::Prompting => write!(f, "prompting"),
            Self::Generating { current, total } => write!(f, "generating {current}/{total}"),
            Self::Composing => write!(f, "composing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Story → scenes → prompts → images → pages
pub struct StoryPipeline {
    catalog: StyleCatalog,
    storage: StorageService,
    segmenter: SceneSegmenter,
    prompt_builder: PromptBuilder,
    image_generator: ImageGenerator,
}

impl StoryPipeline {
    pub fn new(
        client: Arc<dyn ModelClient>,
        catalog: StyleCatalog,
        storage: StorageService,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            segmenter: SceneSegmenter::new(client.clone(), config.min_scene_chars),
            prompt_builder: PromptBuilder::new(catalog.clone(), config.max_prompt_chars),
            image_generator: ImageGenerator::new(client, storage.clone()),
            catalog,
            storage,
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    #[instrument(skip(self, story, options), fields(story_len = story.len(), model = options.model.as_str()))]
    pub async fn run(
        &self,
        story: &str,
        style_key: &str,
        max_scenes: u32,
        options: &ImageOptions,
    ) -> Result<Vec<BookPage>> {
        let started = Instant::now();
        let mut stage = PipelineStage::Idle;

        let result = self
            .run_stages(story, style_key, max_scenes, options, &mut stage)
            .await;

        match &result {
            Ok(pages) => info!(
                stage = %PipelineStage::Done,
                pages = pages.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Storybook generated"
            ),
            Err(e) => error!(
                stage = %PipelineStage::Failed,
                failed_during = %stage,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Storybook generation failed: {}",
                e
            ),
        }

        result
    }

    async fn run_stages(
        &self,
        story: &str,
        style_key: &str,
        max_scenes: u32,
        options: &ImageOptions,
        stage: &mut PipelineStage,
    ) -> Result<Vec<BookPage>> {
        if !self.catalog.contains(style_key) {
            return Err(PromptError::UnknownStyle(style_key.to_string()).into());
        }

        self.storage.ensure_dir().await.map_err(|e| {
            ApiError::Internal(anyhow::anyhow!(
                "Failed to create output directory: {}",
                e
            ))
        })?;

        advance(stage, PipelineStage::Segmenting);
        let scenes = self.segmenter.segment(story, max_scenes).await?;

        advance(stage, PipelineStage::Prompting);
        let prompts = self.prompt_builder.build_prompts(&scenes, style_key)?;

        // Strictly one at a time: each prompt refers to the previous page
        let total = prompts.len();
        let mut images = Vec::with_capacity(total);
        for (i, prompt) in prompts.iter().enumerate() {
            advance(
                stage,
                PipelineStage::Generating {
                    current: i + 1,
                    total,
                },
            );
            images.push(self.image_generator.generate(prompt, options).await?);
        }

        advance(stage, PipelineStage::Composing);
        Ok(composer::compose(&scenes, &images)?)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    info!("Pipeline stage: {} -> {}", stage, next);
    *stage = next;
}
