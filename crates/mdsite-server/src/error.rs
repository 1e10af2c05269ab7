//! Server error types.
//!
//! Maps handler failures to HTTP status codes with JSON error bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No document matched the requested slug.
    #[error("Document not found: {0}")]
    DocNotFound(String),
    /// Asset missing or not a regular file.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    /// Request path failed validation.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// Snapshot build failed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] mdsite_content::ContentError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::DocNotFound(_) | Self::AssetNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServerError::DocNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::AssetNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::InvalidPath("..".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
