use std::sync::Arc;

use crate::config::Config;
use crate::fit::FitConstraints;
use crate::locale::Translations;
use crate::sources::{SiteLayout, SourceFetcher};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Base, data directory and fallback as absolute URLs.
    pub layout: Arc<SiteLayout>,
    /// Pluggable document transport. Default: `SiteFetcher` (site root + allowlisted hosts).
    pub fetcher: Arc<dyn SourceFetcher>,
    pub translations: Arc<Translations>,
    pub fit_constraints: FitConstraints,
}
