// Data source plumbing: where documents live, how they are fetched, which one a
// page load uses, and which ones the dropdown offers.

pub mod fetch;
pub mod handlers;
pub mod listing;
pub mod resolver;

use url::{ParseError, Url};

pub use fetch::{FetchError, SiteFetcher, SourceFetcher};
pub use listing::{list_sources, SourceListing};
pub use resolver::{SourceReference, SourceResolver};

/// Absolute locations derived once from configuration.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// The "page location" relative references resolve against.
    pub base: Url,
    /// Directory holding the data documents and `default.txt`. Ends with `/`.
    pub data_dir: Url,
    /// Hard-coded fallback document.
    pub fallback: Url,
}

impl SiteLayout {
    pub fn new(base: Url, data_dir: &str, fallback: &str) -> Result<Self, ParseError> {
        let data_dir = if data_dir.ends_with('/') {
            base.join(data_dir)?
        } else {
            base.join(&format!("{data_dir}/"))?
        };
        let fallback = base.join(fallback)?;
        Ok(Self {
            base,
            data_dir,
            fallback,
        })
    }

    /// Absolute references are kept as is; relative ones resolve against `base`.
    pub fn resolve_reference(&self, reference: &str) -> Result<Url, ParseError> {
        match Url::parse(reference) {
            Ok(url) => Ok(url),
            Err(ParseError::RelativeUrlWithoutBase) => self.base.join(reference),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_always_ends_with_slash() {
        let base = Url::parse("http://site.test/").unwrap();
        let a = SiteLayout::new(base.clone(), "sources/cv-data", "x.json").unwrap();
        let b = SiteLayout::new(base, "sources/cv-data/", "x.json").unwrap();
        assert_eq!(a.data_dir.as_str(), "http://site.test/sources/cv-data/");
        assert_eq!(a.data_dir, b.data_dir);
    }

    #[test]
    fn test_resolve_reference() {
        let layout = SiteLayout::new(
            Url::parse("file:///srv/site/").unwrap(),
            "sources/cv-data/",
            "sources/cv-data/cv-data.json",
        )
        .unwrap();
        assert_eq!(
            layout.resolve_reference("sources/other.json").unwrap().as_str(),
            "file:///srv/site/sources/other.json"
        );
        assert_eq!(
            layout.resolve_reference("http://h/cv.json").unwrap().as_str(),
            "http://h/cv.json"
        );
        assert_eq!(
            layout.fallback.as_str(),
            "file:///srv/site/sources/cv-data/cv-data.json"
        );
    }
}
