mod config;
mod document;
mod errors;
mod fit;
mod locale;
mod prefs;
mod render;
mod routes;
mod sources;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::config::Config;
use crate::fit::FitConstraints;
use crate::locale::Translations;
use crate::routes::build_router;
use crate::sources::{SiteFetcher, SiteLayout};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV site v{}", env!("CARGO_PKG_VERSION"));

    // Site root: relative document references resolve against it, file reads stay in it
    let site_root = std::fs::canonicalize(&config.site_root)
        .with_context(|| format!("SITE_ROOT {} is not accessible", config.site_root.display()))?;
    let base = Url::from_directory_path(&site_root)
        .map_err(|()| anyhow!("SITE_ROOT {} is not an absolute path", site_root.display()))?;
    let layout = SiteLayout::new(base, &config.data_dir, &config.default_source)
        .context("DATA_DIR and DEFAULT_SOURCE must be valid references")?;
    info!(
        "Site root {} (data: {}, fallback: {})",
        layout.base, layout.data_dir, layout.fallback
    );

    if config.allowed_source_hosts.is_empty() {
        info!("Remote documents disabled (ALLOWED_SOURCE_HOSTS is empty)");
    } else {
        info!("Remote document hosts: {}", config.allowed_source_hosts.join(", "));
    }
    let fetcher = SiteFetcher::new(site_root, config.allowed_source_hosts.clone())
        .context("Failed to build HTTP client")?;

    // Labels: built-in tables overlaid with I18N_DIR files
    let translations = Translations::load(&config.i18n_dir).await;

    let fit_constraints = FitConstraints {
        breakpoint_px: config.fit_breakpoint_px,
        min_scale: config.fit_min_scale,
    };
    info!(
        "Fit: breakpoint {}px, debounce {:?}, min scale {:?}",
        fit_constraints.breakpoint_px, config.fit_debounce, fit_constraints.min_scale
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        layout: Arc::new(layout),
        fetcher: Arc::new(fetcher),
        translations: Arc::new(translations),
        fit_constraints,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
