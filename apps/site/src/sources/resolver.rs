//! Decides which data document a page load uses.
//!
//! Priority: explicit `?file=` parameter, then the `default.txt` descriptor in the
//! data directory (only if the document it names is reachable), then the fixed
//! fallback. Probe failures are logged and never surface to the caller.

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::sources::fetch::SourceFetcher;
use crate::sources::SiteLayout;

/// Name of the descriptor file probed inside the data directory.
pub const DEFAULT_DESCRIPTOR: &str = "default.txt";

/// Which rule produced a [`SourceReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    Explicit,
    Descriptor,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReference {
    pub url: Url,
    pub origin: SourceOrigin,
}

pub struct SourceResolver<'a> {
    layout: &'a SiteLayout,
    fetcher: &'a dyn SourceFetcher,
}

impl<'a> SourceResolver<'a> {
    pub fn new(layout: &'a SiteLayout, fetcher: &'a dyn SourceFetcher) -> Self {
        Self { layout, fetcher }
    }

    /// Resolves the document reference. Always succeeds.
    pub async fn resolve(&self, explicit: Option<&str>) -> SourceReference {
        if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
            match self.layout.resolve_reference(explicit) {
                Ok(url) => {
                    return SourceReference {
                        url,
                        origin: SourceOrigin::Explicit,
                    }
                }
                Err(e) => warn!("Ignoring unusable source parameter '{explicit}': {e}"),
            }
        }

        if let Some(url) = self.probe_descriptor().await {
            return SourceReference {
                url,
                origin: SourceOrigin::Descriptor,
            };
        }

        SourceReference {
            url: self.layout.fallback.clone(),
            origin: SourceOrigin::Fallback,
        }
    }

    /// Name written in the descriptor, if it exists and is non-empty.
    pub async fn descriptor_name(&self) -> Option<String> {
        let descriptor = self.layout.data_dir.join(DEFAULT_DESCRIPTOR).ok()?;
        match self.fetcher.fetch_text(&descriptor).await {
            Ok(text) => {
                let name = text.trim();
                if name.is_empty() {
                    debug!("{descriptor} is empty");
                    None
                } else {
                    Some(name.to_string())
                }
            }
            Err(e) => {
                warn!("Could not read {descriptor}: {e}");
                None
            }
        }
    }

    async fn probe_descriptor(&self) -> Option<Url> {
        let name = self.descriptor_name().await?;
        let url = match self.layout.data_dir.join(&name) {
            Ok(url) => url,
            Err(e) => {
                warn!("Default document name '{name}' is not a valid reference: {e}");
                return None;
            }
        };
        if !self.fetcher.exists(&url).await {
            warn!("Default document {url} is unreachable, using fallback");
            return None;
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::testing::MemoryFetcher;

    fn layout() -> SiteLayout {
        SiteLayout::new(
            Url::parse("http://site.test/").unwrap(),
            "sources/cv-data",
            "sources/cv-data/cv-data.json",
        )
        .unwrap()
    }

    const DESCRIPTOR: &str = "http://site.test/sources/cv-data/default.txt";

    #[tokio::test]
    async fn test_explicit_relative_parameter_resolves_against_base() {
        let layout = layout();
        let fetcher = MemoryFetcher::default().with_file(DESCRIPTOR, "other.json");
        let resolved = SourceResolver::new(&layout, &fetcher)
            .resolve(Some("mine/cv.json"))
            .await;
        assert_eq!(resolved.url.as_str(), "http://site.test/mine/cv.json");
        assert_eq!(resolved.origin, SourceOrigin::Explicit);
    }

    #[tokio::test]
    async fn test_explicit_absolute_parameter_is_used_verbatim() {
        let layout = layout();
        let fetcher = MemoryFetcher::default();
        let resolved = SourceResolver::new(&layout, &fetcher)
            .resolve(Some("https://cdn.example.com/cv.json"))
            .await;
        assert_eq!(resolved.url.as_str(), "https://cdn.example.com/cv.json");
        assert_eq!(resolved.origin, SourceOrigin::Explicit);
    }

    #[tokio::test]
    async fn test_empty_parameter_is_ignored() {
        let layout = layout();
        let fetcher = MemoryFetcher::default();
        let resolved = SourceResolver::new(&layout, &fetcher)
            .resolve(Some(""))
            .await;
        assert_eq!(resolved.origin, SourceOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_reachable_descriptor_document_is_used() {
        let layout = layout();
        let fetcher = MemoryFetcher::default()
            .with_file(DESCRIPTOR, "  portfolio.json\n")
            .with_file("http://site.test/sources/cv-data/portfolio.json", "{}");
        let resolved = SourceResolver::new(&layout, &fetcher).resolve(None).await;
        assert_eq!(
            resolved.url.as_str(),
            "http://site.test/sources/cv-data/portfolio.json"
        );
        assert_eq!(resolved.origin, SourceOrigin::Descriptor);
    }

    #[tokio::test]
    async fn test_unreachable_descriptor_document_falls_back() {
        let layout = layout();
        let fetcher = MemoryFetcher::default().with_file(DESCRIPTOR, "portfolio.json");
        let resolved = SourceResolver::new(&layout, &fetcher).resolve(None).await;
        assert_eq!(
            resolved.url.as_str(),
            "http://site.test/sources/cv-data/cv-data.json"
        );
        assert_eq!(resolved.origin, SourceOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_missing_or_blank_descriptor_falls_back() {
        let layout = layout();
        let missing = MemoryFetcher::default();
        let resolved = SourceResolver::new(&layout, &missing).resolve(None).await;
        assert_eq!(resolved.origin, SourceOrigin::Fallback);

        let blank = MemoryFetcher::default().with_file(DESCRIPTOR, " \n ");
        let resolver = SourceResolver::new(&layout, &blank);
        assert_eq!(resolver.descriptor_name().await, None);
        assert_eq!(resolver.resolve(None).await.origin, SourceOrigin::Fallback);
    }
}
