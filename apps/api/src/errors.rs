use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP front end.
///
/// Every variant renders the same `{success: false, message}` body; only the
/// status differs. Pipeline stage failures never show up here, the
/// orchestrator folds them into its own outcome.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad upload: missing file, empty name, disallowed extension.
    #[error("{0}")]
    Validation(String),

    #[error("File too large. Maximum size is {0}.")]
    PayloadTooLarge(String),

    /// Requested download is missing or unreadable.
    #[error("{0}")]
    DownloadUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DownloadUnavailable(_) => StatusCode::OK,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                INTERNAL_MESSAGE.to_string()
            }
            AppError::PayloadTooLarge(_) => {
                tracing::warn!("File too large uploaded");
                self.to_string()
            }
            other => {
                tracing::warn!("{other}");
                other.to_string()
            }
        };

        (self.status(), failure_body(&message)).into_response()
    }
}

pub const INTERNAL_MESSAGE: &str = "An internal server error occurred. Please try again later.";

/// The JSON shape every failure response shares.
pub fn failure_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": false,
        "message": message
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::OK);
        assert_eq!(
            AppError::PayloadTooLarge("16MB".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_too_large_message() {
        assert_eq!(
            AppError::PayloadTooLarge("16MB".into()).to_string(),
            "File too large. Maximum size is 16MB."
        );
    }
}
