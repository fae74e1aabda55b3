pub mod health;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::document::handlers::handle_get_document;
use crate::fit::handlers::handle_fit_ws;
use crate::render::handlers::handle_page;
use crate::sources::handlers::handle_list_sources;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(state.config.site_root.join("sources"));

    Router::new()
        .route("/", get(handle_page))
        .route("/health", get(health::health_handler))
        // Document API
        .route("/api/v1/document", get(handle_get_document))
        .route("/api/v1/sources", get(handle_list_sources))
        // Fit-to-page
        .route("/api/v1/fit/ws", get(handle_fit_ws))
        // Stylesheet, images and the data documents themselves
        .nest_service("/sources", assets)
        .with_state(state)
}
