use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matcher::ReportKind;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// `NotFound` and `InvalidState` carry fixed messages per report kind so
/// clients can branch on them.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{}", not_found_message(.0))]
    ReportNotFound(ReportKind),

    #[error("{}", invalid_state_message(.0))]
    InvalidState(ReportKind),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Match error: {0}")]
    Match(#[from] matcher::MatchError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

fn not_found_message(kind: &ReportKind) -> &'static str {
    match kind {
        ReportKind::Lost => "Lost item not found",
        ReportKind::Found => "Found item not found",
    }
}

fn invalid_state_message(kind: &ReportKind) -> &'static str {
    match kind {
        ReportKind::Lost => "This lost item has already been resolved",
        ReportKind::Found => "This found item has already been claimed",
    }
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) | ServerError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ServerError::ReportNotFound(_) | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::Store(_)
            | ServerError::Match(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::ReportNotFound(_) | ServerError::NotFound => "NOT_FOUND",
            ServerError::InvalidState(_) => "INVALID_STATE",
            ServerError::Forbidden(_) => "FORBIDDEN",
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::Match(_) => "MATCH_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

impl From<finditback::ConfigLoadError> for ServerError {
    fn from(err: finditback::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}
