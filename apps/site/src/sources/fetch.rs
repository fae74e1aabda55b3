//! Fetching data documents by reference.
//!
//! `SiteFetcher` serves `file://` references from the site root (never outside it)
//! and `http(s)://` references through reqwest, for allowlisted hosts only. `AppState` carries the fetcher as
//! `Arc<dyn SourceFetcher>` so tests can swap in an in-memory backend.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: Url, status: u16 },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is outside the site root")]
    OutsideRoot(Url),

    #[error("unsupported reference {0}")]
    UnsupportedScheme(Url),

    #[error("{0} is not on an allowed source host")]
    HostNotAllowed(Url),
}

/// Text fetch primitive used by the resolver, the listing and the page pipeline.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetches the resource as text. Non-success statuses are errors.
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError>;

    /// Existence check. Any failure counts as unreachable.
    async fn exists(&self, url: &Url) -> bool {
        self.fetch_text(url).await.is_ok()
    }

    /// File names of the `.json` documents directly inside `dir`.
    async fn list_json(&self, dir: &Url) -> Result<Vec<String>, FetchError>;
}

/// Production fetcher: local site files plus remote HTTP documents.
pub struct SiteFetcher {
    root: PathBuf,
    client: Client,
    /// Lowercase host names remote references may point at. Empty: none.
    allowed_hosts: Vec<String>,
}

impl SiteFetcher {
    /// `root` must already be canonical; containment checks compare against it.
    pub fn new(root: PathBuf, allowed_hosts: Vec<String>) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            root,
            client,
            allowed_hosts,
        })
    }

    fn check_host(&self, url: &Url) -> Result<(), FetchError> {
        if host_allowed(&self.allowed_hosts, url) {
            Ok(())
        } else {
            Err(FetchError::HostNotAllowed(url.clone()))
        }
    }

    /// Maps a `file://` reference to a canonical path inside the site root.
    async fn local_path(&self, url: &Url) -> Result<PathBuf, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::UnsupportedScheme(url.clone()))?;
        let canonical = tokio::fs::canonicalize(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })?;
        if !canonical.starts_with(&self.root) {
            return Err(FetchError::OutsideRoot(url.clone()));
        }
        Ok(canonical)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String, FetchError> {
        self.check_host(url)?;
        let response = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SourceFetcher for SiteFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching {url}");
        match url.scheme() {
            "file" => {
                let path = self.local_path(url).await?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io { path, source })
            }
            "http" | "https" => self.fetch_remote(url).await,
            _ => Err(FetchError::UnsupportedScheme(url.clone())),
        }
    }

    async fn exists(&self, url: &Url) -> bool {
        match url.scheme() {
            "file" => match self.local_path(url).await {
                Ok(path) => tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false),
                Err(_) => false,
            },
            _ => self.fetch_text(url).await.is_ok(),
        }
    }

    async fn list_json(&self, dir: &Url) -> Result<Vec<String>, FetchError> {
        match dir.scheme() {
            "file" => {
                let path = self.local_path(dir).await?;
                list_json_dir(&path).await
            }
            "http" | "https" => {
                let index = self.fetch_remote(dir).await?;
                Ok(scrape_json_links(&index, dir))
            }
            _ => Err(FetchError::UnsupportedScheme(dir.clone())),
        }
    }
}

/// Exact, case-insensitive host match. Ports are not part of the match.
fn host_allowed(allowed: &[String], url: &Url) -> bool {
    url.host_str()
        .map(|host| host.to_ascii_lowercase())
        .is_some_and(|host| allowed.iter().any(|a| *a == host))
}

async fn list_json_dir(path: &Path) -> Result<Vec<String>, FetchError> {
    let io_err = |source: std::io::Error| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = tokio::fs::read_dir(path).await.map_err(io_err)?;
    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(io_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase().ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']([^"']*)["']"#).expect("href regex must compile")
    })
}

/// Extracts `.json` file names from an HTML directory index page.
fn scrape_json_links(index_html: &str, dir: &Url) -> Vec<String> {
    href_re()
        .captures_iter(index_html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|href| *href != "../" && *href != "./")
        .filter_map(|href| dir.join(href).ok())
        .filter(|abs| abs.path().to_lowercase().ends_with(".json"))
        .filter_map(|abs| {
            let last = abs.path_segments()?.next_back()?.to_string();
            Some(
                urlencoding::decode(&last)
                    .map(|s| s.into_owned())
                    .unwrap_or(last),
            )
        })
        .collect()
}
