use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::document::handlers::FileQuery;
use crate::sources::{list_sources, SourceListing, SourceReference, SourceResolver};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SourcesResponse {
    pub source: SourceReference,
    pub listing: SourceListing,
}

/// GET /api/v1/sources
pub async fn handle_list_sources(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
) -> Json<SourcesResponse> {
    let source = SourceResolver::new(&state.layout, state.fetcher.as_ref())
        .resolve(params.file.as_deref())
        .await;
    let listing = list_sources(&state.layout, state.fetcher.as_ref(), &source.url).await;
    Json(SourcesResponse { source, listing })
}
