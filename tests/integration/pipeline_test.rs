use crate::common::{file_count, scenes_reply, test_config, FakeModelClient};
use std::sync::Arc;
use storybook_illustrator::{
    error::{ApiError, PromptError},
    models::image::{ImageEncoding, ImageModel, ImageOptions},
    services::{prompt_builder::CONTINUITY_CLAUSE, StorageService, StoryPipeline, StyleCatalog},
};
use tempfile::TempDir;

fn pipeline_with(client: Arc<FakeModelClient>, temp_dir: &TempDir) -> StoryPipeline {
    let config = test_config(&temp_dir.path().join("output"));
    StoryPipeline::new(
        client,
        StyleCatalog::default(),
        StorageService::new(&config.output),
        &config.pipeline,
    )
}

#[tokio::test]
async fn dragon_story_gets_two_pages_with_continuity_on_the_second() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(FakeModelClient::with_url_images(
        r#"[{"index": 1, "text": "A dragon flies."}, {"index": 2, "text": "Later, it lands."}]"#,
    ));
    let pipeline = pipeline_with(client.clone(), &temp_dir);

    let pages = pipeline
        .run(
            "A dragon flies. Later, it lands.",
            "storybook",
            2,
            &ImageOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].text, "A dragon flies.");
    assert_eq!(pages[1].text, "Later, it lands.");
    assert!(pages.iter().all(|p| p.image_type == ImageEncoding::Url));

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Scene 1: A dragon flies."));
    assert!(!prompts[0].contains(CONTINUITY_CLAUSE.trim()));
    assert!(prompts[1].contains("Scene 2: Later, it lands."));
    assert!(prompts[1].contains(CONTINUITY_CLAUSE.trim()));

    // Story goes to the text model verbatim, limit goes into the instructions
    let chat_calls = client.chat_calls.lock().unwrap();
    assert_eq!(chat_calls.len(), 1);
    assert!(chat_calls[0].0.contains("maximum of 2 scenes"));
    assert_eq!(chat_calls[0].1, "A dragon flies. Later, it lands.");
}

#[tokio::test]
async fn page_count_never_exceeds_max_images() {
    for max_images in 1..=4u32 {
        let temp_dir = TempDir::new().unwrap();
        let client = Arc::new(FakeModelClient::with_url_images(scenes_reply(6)));
        let pipeline = pipeline_with(client.clone(), &temp_dir);

        let pages = pipeline
            .run("Long story.", "manga", max_images, &ImageOptions::default())
            .await
            .unwrap();

        assert_eq!(pages.len(), max_images as usize);
        assert_eq!(client.prompts().len(), pages.len());
    }
}

#[tokio::test]
async fn images_are_requested_in_scene_order() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(FakeModelClient::with_url_images(scenes_reply(4)));
    let pipeline = pipeline_with(client.clone(), &temp_dir);

    let pages = pipeline
        .run("Story.", "pixel", 4, &ImageOptions::default())
        .await
        .unwrap();

    for (i, prompt) in client.prompts().iter().enumerate() {
        assert!(prompt.contains(&format!("Scene {}: Scene number {} of the story.", i + 1, i + 1)));
        assert_eq!(prompt.contains(CONTINUITY_CLAUSE.trim()), i > 0);
    }
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.text, format!("Scene number {} of the story.", i + 1));
    }
}

#[tokio::test]
async fn inline_images_write_image_and_sidecar() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(FakeModelClient::with_inline_images(scenes_reply(2)));
    let pipeline = pipeline_with(client, &temp_dir);
    let options = ImageOptions {
        model: ImageModel::GptImage1,
        ..ImageOptions::default()
    };

    let pages = pipeline
        .run("Story.", "lowpoly", 2, &options)
        .await
        .unwrap();

    assert!(pages.iter().all(|p| p.image_type == ImageEncoding::Base64));
    assert_eq!(file_count(&temp_dir.path().join("output")), 4);
}

#[tokio::test]
async fn unknown_style_fails_before_any_model_call() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(FakeModelClient::with_url_images(scenes_reply(2)));
    let pipeline = pipeline_with(client.clone(), &temp_dir);

    let err = pipeline
        .run("Story.", "origami", 2, &ImageOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Prompt(PromptError::UnknownStyle(_))));
    assert_eq!(client.chat_call_count(), 0);
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn too_short_scene_aborts_before_images() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(FakeModelClient::with_url_images(
        r#"{"scenes": [{"index": 1, "text": "A dragon flies."}, {"index": 2, "text": "!"}]}"#,
    ));
    let pipeline = pipeline_with(client.clone(), &temp_dir);

    let err = pipeline
        .run("Story.", "storybook", 5, &ImageOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Segmentation(_)));
    assert!(client.prompts().is_empty());
}
