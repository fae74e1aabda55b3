use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus whether the fallback document can currently be fetched.
/// An unreachable fallback reports `"degraded"` but still answers 200.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let fallback_reachable = state.fetcher.exists(&state.layout.fallback).await;
    Json(json!({
        "status": if fallback_reachable { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cv-site",
        "data_dir": state.layout.data_dir.as_str(),
        "fallback_reachable": fallback_reachable
    }))
}
