// Service modules
pub mod ai_service;
pub mod composer;
pub mod image_service;
pub mod pipeline;
pub mod prompt_builder;
pub mod segmenter;
pub mod storage_service;
pub mod style_catalog;

pub use ai_service::{AIService, ModelClient};
pub use image_service::ImageGenerator;
pub use pipeline::StoryPipeline;
pub use storage_service::StorageService;
pub use style_catalog::StyleCatalog;
