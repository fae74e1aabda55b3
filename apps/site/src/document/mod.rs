// Résumé documents: the data model and the lenient parser that reads it.

pub mod handlers;
pub mod lenient;
pub mod model;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::errors::AppError;
use crate::sources::SourceFetcher;

use self::lenient::parse_lenient;
use self::model::Document;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Fetches and parses one document.
///
/// Transport failures map to `AppError::Fetch`, parse failures to
/// `AppError::Document`; neither carries a partially parsed value.
pub async fn load_document(fetcher: &dyn SourceFetcher, url: &Url) -> Result<Document, AppError> {
    let raw = fetcher.fetch_text(url).await?;
    let document = parse_lenient(&raw)?;
    debug!(
        "Loaded {url} (title: {:?}, locale: {:?})",
        document.meta.title,
        document.meta.declared_locale()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::testing::MemoryFetcher;

    #[tokio::test]
    async fn test_load_document_parses_lenient_body() {
        let fetcher = MemoryFetcher::default().with_file(
            "http://site.test/cv.json",
            "{\"meta\": {\"title\": \"Dev\",}, /* x */ \"data\": {\"name\": \"Ada\"}}",
        );
        let url = Url::parse("http://site.test/cv.json").unwrap();
        let doc = load_document(&fetcher, &url).await.unwrap();
        assert_eq!(doc.data.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_numeric_year_is_not_malformed() {
        let fetcher = MemoryFetcher::default().with_file(
            "http://site.test/cv.json",
            r#"{"data":{"awards":[{"name":"Medal","year":2020}]}}"#,
        );
        let url = Url::parse("http://site.test/cv.json").unwrap();
        let doc = load_document(&fetcher, &url).await.unwrap();
        let awards = doc.data.awards.unwrap();
        assert_eq!(awards[0].year.as_deref(), Some("2020"));
    }

    #[tokio::test]
    async fn test_load_document_distinguishes_failures() {
        let fetcher = MemoryFetcher::default().with_file("http://site.test/bad.json", "{\"data\": ");
        let missing = Url::parse("http://site.test/missing.json").unwrap();
        let bad = Url::parse("http://site.test/bad.json").unwrap();

        assert!(matches!(
            load_document(&fetcher, &missing).await,
            Err(AppError::Fetch(_))
        ));
        assert!(matches!(
            load_document(&fetcher, &bad).await,
            Err(AppError::Document(_))
        ));
    }
}
