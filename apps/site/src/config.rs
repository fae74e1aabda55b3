use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::fit::scale::DEFAULT_BREAKPOINT_PX;
use crate::fit::DEFAULT_DEBOUNCE;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory served at `/`; `file:` document references may not leave it.
    pub site_root: PathBuf,
    /// Data directory, relative to the site root.
    pub data_dir: String,
    /// Fallback document, relative to the site root.
    pub default_source: String,
    pub i18n_dir: PathBuf,
    /// Hosts `http(s)` document references may be fetched from. Empty: site files only.
    pub allowed_source_hosts: Vec<String>,
    pub fit_breakpoint_px: f64,
    pub fit_debounce: Duration,
    pub fit_min_scale: Option<f64>,
    /// Runtime language used when a request carries no `Accept-Language`.
    pub runtime_lang: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let site_root = PathBuf::from(env_or("SITE_ROOT", "."));
        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            data_dir: env_or("DATA_DIR", "sources/cv-data/"),
            default_source: env_or("DEFAULT_SOURCE", "sources/cv-data/cv-data.json"),
            i18n_dir: std::env::var("I18N_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| site_root.join("sources/i18n")),
            allowed_source_hosts: parse_host_list(&env_or("ALLOWED_SOURCE_HOSTS", "")),
            fit_breakpoint_px: match std::env::var("FIT_BREAKPOINT_PX") {
                Ok(v) => v
                    .parse::<f64>()
                    .context("FIT_BREAKPOINT_PX must be a number")?,
                Err(_) => DEFAULT_BREAKPOINT_PX,
            },
            fit_debounce: match std::env::var("FIT_DEBOUNCE_MS") {
                Ok(v) => Duration::from_millis(
                    v.parse::<u64>()
                        .context("FIT_DEBOUNCE_MS must be a whole number of milliseconds")?,
                ),
                Err(_) => DEFAULT_DEBOUNCE,
            },
            fit_min_scale: std::env::var("FIT_MIN_SCALE")
                .ok()
                .map(|v| v.parse::<f64>())
                .transpose()
                .context("FIT_MIN_SCALE must be a number")?,
            runtime_lang: std::env::var("LANG").ok().filter(|v| !v.trim().is_empty()),
            site_root,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated host names, trimmed and lowercased.
fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

#[cfg(test)]
impl Config {
    /// Defaults rooted at `site_root`, without touching the environment.
    pub fn for_tests(site_root: PathBuf) -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            data_dir: "sources/cv-data/".to_string(),
            default_source: "sources/cv-data/cv-data.json".to_string(),
            i18n_dir: site_root.join("sources/i18n"),
            allowed_source_hosts: Vec::new(),
            fit_breakpoint_px: DEFAULT_BREAKPOINT_PX,
            fit_debounce: DEFAULT_DEBOUNCE,
            fit_min_scale: None,
            runtime_lang: None,
            site_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_list_is_trimmed_and_lowercased() {
        assert_eq!(
            parse_host_list(" CDN.example.com, ,raw.githubusercontent.com "),
            vec!["cdn.example.com", "raw.githubusercontent.com"]
        );
        assert!(parse_host_list("").is_empty());
    }
}
