// Route modules
pub mod book;

use crate::{app_state::AppState, middleware::logging_middleware};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the main router: the JSON API plus the generated-image mount
pub fn create_router(state: AppState) -> Router {
    let output = &state.config.output;
    let public_prefix = output.public_prefix.trim_end_matches('/').to_string();
    let output_dir = ServeDir::new(&output.dir);

    Router::new()
        .nest("/api", api_routes())
        .nest_service(&public_prefix, output_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes with request/response body logging
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(book::generate_book))
        .route("/styles", get(book::list_styles))
        .layer(middleware::from_fn(logging_middleware))
}
