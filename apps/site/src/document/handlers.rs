use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::document::load_document;
use crate::document::model::Document;
use crate::errors::AppError;
use crate::locale::{select_locale, Locale};
use crate::prefs::{CookiePrefs, KeyValueStore, LOCALE_KEY};
use crate::render::handlers::runtime_language;
use crate::sources::{SourceReference, SourceResolver};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub file: Option<String>,
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub source: SourceReference,
    pub locale: Locale,
    pub document: Document,
}

/// GET /api/v1/document
///
/// Same resolution and locale rules as the page, without rendering. The `lang`
/// cookie is read but not written.
pub async fn handle_get_document(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
    headers: HeaderMap,
) -> Result<Json<DocumentResponse>, AppError> {
    let source = SourceResolver::new(&state.layout, state.fetcher.as_ref())
        .resolve(params.file.as_deref())
        .await;
    let document = load_document(state.fetcher.as_ref(), &source.url).await?;
    let persisted = CookiePrefs::from_headers(&headers).get(LOCALE_KEY);
    let runtime = runtime_language(&headers, &state.config);
    let locale = select_locale(&document.meta, persisted.as_deref(), runtime.as_deref());
    Ok(Json(DocumentResponse {
        source,
        locale,
        document,
    }))
}
