//! Error types shared by the upstream client and the HTTP layer.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure of a single upstream request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection problem, TLS failure or per-fetch timeout.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream body could not be decoded: {0}")]
    Decode(String),

    /// The platform answered 200 with a non-success `ErrorCode`.
    #[error("upstream rejected request: {status} ({code})")]
    Rejected { code: i32, status: String },
}

/// Errors surfaced to the browser client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    AccountNotFound(String),

    #[error("upstream unavailable")]
    Upstream(#[from] UpstreamError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::AccountNotFound(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Upstream(e) => log::error!("upstream failure: {e}"),
            ApiError::Internal(e) => log::error!("internal failure: {e:?}"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(UpstreamError::Status(503)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
