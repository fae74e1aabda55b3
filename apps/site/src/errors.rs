use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::DocumentError;
use crate::sources::FetchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not load document: {0}")]
    Fetch(#[from] FetchError),

    #[error("Could not parse document: {0}")]
    Document(#[from] DocumentError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Fetch(
                FetchError::OutsideRoot(_)
                | FetchError::UnsupportedScheme(_)
                | FetchError::HostNotAllowed(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Document(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Fetch(
                FetchError::OutsideRoot(_)
                | FetchError::UnsupportedScheme(_)
                | FetchError::HostNotAllowed(_),
            ) => "INVALID_SOURCE",
            AppError::Fetch(_) => "SOURCE_UNREACHABLE",
            AppError::Document(_) => "MALFORMED_DOCUMENT",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::warn!("{self}");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_status_mapping() {
        let url = Url::parse("http://site.test/cv.json").unwrap();
        let unreachable = AppError::from(FetchError::Status {
            url: url.clone(),
            status: 500,
        });
        assert_eq!(unreachable.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(unreachable.code(), "SOURCE_UNREACHABLE");

        let outside = AppError::from(FetchError::OutsideRoot(url));
        assert_eq!(outside.status(), StatusCode::BAD_REQUEST);

        let internal = Url::parse("http://10.0.0.5:8080/cv.json").unwrap();
        let disallowed = AppError::from(FetchError::HostNotAllowed(internal));
        assert_eq!(disallowed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(disallowed.code(), "INVALID_SOURCE");

        let malformed = serde_json::from_str::<serde_json::Value>("{")
            .map_err(DocumentError::Malformed)
            .map_err(AppError::from)
            .unwrap_err();
        assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
