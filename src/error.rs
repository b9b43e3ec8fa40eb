use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::auth::ErrorResponse;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("The state did not match")]
    InvalidState,

    #[error("Bad request")]
    MissingCode,

    #[error("Google account not connected")]
    NotConfigured,

    #[error("YouTube account is not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Unauthorized(String),

    #[error("YouTube API error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl FeedError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedError::InvalidState
            | FeedError::MissingCode
            | FeedError::NotConfigured
            | FeedError::NotAuthenticated
            | FeedError::Validation(_) => StatusCode::BAD_REQUEST,
            FeedError::NotFound => StatusCode::NOT_FOUND,
            FeedError::Unauthorized(_) | FeedError::Token(_) => StatusCode::UNAUTHORIZED,
            FeedError::Provider(_) => StatusCode::BAD_GATEWAY,
            FeedError::Database(_) | FeedError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Errors coming from the provider are logged and swallowed during a sync run
    pub fn is_provider(&self) -> bool {
        matches!(self, FeedError::Provider(_))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Provider(err.to_string())
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
