use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

/// Failures talking to the remote aggregate store or the geolocation service.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("server responded with status {0}")]
    ServerError(u16),
    #[error("malformed response payload: {0}")]
    DecodingError(String),
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::DecodingError(e.to_string())
        } else if e.is_builder() {
            BackendError::InvalidRequest(e.to_string())
        } else if let Some(status) = e.status() {
            BackendError::ServerError(status.as_u16())
        } else {
            BackendError::NetworkUnavailable(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let (status, message) = match self {
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Backend(_) => (StatusCode::BAD_GATEWAY, "Backend unavailable"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        HttpResponse::build(status).json(&serde_json::json!({ "error": message }))
    }
}
