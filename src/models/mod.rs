// Request/Response models
pub mod book;
pub mod image;
