use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::book::{GenerateBookRequest, GenerateBookResponse, StylesResponse},
};

/// POST /api/generate
#[instrument(skip(state, payload))]
pub async fn generate_book(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateBookRequest>, JsonRejection>,
) -> Result<Json<GenerateBookResponse>> {
    let Json(request) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    // Blank stories are rejected; the text itself is passed on untouched
    let story = request
        .story
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Story text is required".to_string()))?;

    let catalog = state.pipeline.catalog();
    if !catalog.contains(&request.style) {
        return Err(ApiError::BadRequest(catalog.invalid_style_message()));
    }

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let limit = state.config.pipeline.max_images_limit;
    if request.max_images > limit {
        return Err(ApiError::BadRequest(format!(
            "maxImages must be between 1 and {}",
            limit
        )));
    }

    // The run is detached from the request future so a dropped connection
    // does not interrupt in-flight model calls or file writes
    let pipeline = state.pipeline.clone();
    let GenerateBookRequest {
        style,
        max_images,
        image_options,
        ..
    } = request;
    let pages = tokio::spawn(async move {
        pipeline
            .run(&story, &style, max_images, &image_options)
            .await
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("Pipeline task failed: {}", e)))??;

    Ok(Json(GenerateBookResponse::new(pages)))
}

/// GET /api/styles
pub async fn list_styles(State(state): State<AppState>) -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: state.pipeline.catalog().entries(),
    })
}
