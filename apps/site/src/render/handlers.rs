use axum::{
    extract::{Query, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap},
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::document::handlers::FileQuery;
use crate::document::load_document;
use crate::document::model::Meta;
use crate::locale::{primary_language, select_locale, Locale};
use crate::prefs::{CookiePrefs, KeyValueStore, LOCALE_KEY};
use crate::render::page::{page_heading, page_title, render_error_page, render_page, PageContext};
use crate::render::sections::build_cv;
use crate::sources::{list_sources, SourceResolver};
use crate::state::AppState;

/// First tag of `Accept-Language`, else the `LANG` captured at startup.
pub fn runtime_language(headers: &HeaderMap, config: &Config) -> Option<String> {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(primary_language)
        .map(str::to_string)
        .or_else(|| config.runtime_lang.clone())
}

fn persist_locale(prefs: &dyn KeyValueStore, locale: Locale) {
    if let Err(e) = prefs.set(LOCALE_KEY, locale.code()) {
        warn!("Could not persist locale preference: {e}");
    }
}

/// GET /
///
/// resolve → fetch → parse → select locale → list sources → render. The tree is
/// only built once both the document and the locale are settled. The chosen locale
/// goes back to the client as a `lang` cookie.
pub async fn handle_page(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
    headers: HeaderMap,
) -> Response {
    let fetcher = state.fetcher.as_ref();
    let source = SourceResolver::new(&state.layout, fetcher)
        .resolve(params.file.as_deref())
        .await;
    let loaded = load_document(fetcher, &source.url).await;
    let listing = list_sources(&state.layout, fetcher, &source.url).await;

    let prefs = CookiePrefs::from_headers(&headers);
    let persisted = prefs.get(LOCALE_KEY);
    let runtime = runtime_language(&headers, &state.config);

    match loaded {
        Ok(document) => {
            let locale = select_locale(&document.meta, persisted.as_deref(), runtime.as_deref());
            persist_locale(&prefs, locale);

            let labels = state.translations.labels(locale);
            let cv = build_cv(&document.data, &labels);
            info!(
                source = %source.url,
                origin = ?source.origin,
                %locale,
                sections = cv.sections.len(),
                omitted = cv.omitted.len(),
                "Rendered CV"
            );

            let ctx = PageContext {
                labels,
                listing: &listing,
                title: page_title(&document.data, &document.meta),
                heading: page_heading(&document.data),
                favicon: document.data.profile_picture.as_deref(),
            };
            let mut response = Html(render_page(&ctx, cv.root)).into_response();
            prefs.write_to(response.headers_mut());
            response
        }
        Err(err) => {
            error!(source = %source.url, "Failed to load CV data: {err}");
            let locale = select_locale(&Meta::default(), persisted.as_deref(), runtime.as_deref());
            debug!(%locale, "Rendering error page");
            let ctx = PageContext {
                labels: state.translations.labels(locale),
                listing: &listing,
                title: "CV".to_string(),
                heading: "CV".to_string(),
                favicon: None,
            };
            (err.status(), Html(render_error_page(&ctx, err.code()))).into_response()
        }
    }
}
