//! Common error types for the print asset pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
///
/// Every pipeline phase fails with its own variant so the caller can tell which
/// step aborted the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Image synthesis failed{}: {message}", status_suffix(.status))]
    UpstreamSynthesis { status: Option<u16>, message: String },

    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("Asset fetch timed out: {0}")]
    AssetFetchTimeout(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Staged upload target request failed: {0}")]
    StagedUploadTarget(String),

    #[error("Object store upload failed{}: {body}", status_suffix(.status))]
    ObjectStoreUpload { status: Option<u16>, body: String },

    #[error("Asset registration failed: {0}")]
    AssetRegistration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

impl AppError {
    /// Stable machine-readable tag for the failure class
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::UnsupportedMethod(_) => "unsupported_method",
            AppError::RateLimitExceeded => "rate_limit_exceeded",
            AppError::UpstreamSynthesis { .. } => "upstream_synthesis_error",
            AppError::AssetUnavailable(_) => "asset_unavailable",
            AppError::AssetFetchTimeout(_) => "asset_fetch_timeout",
            AppError::InvalidDimensions(_) => "invalid_dimensions",
            AppError::ImageProcessing(_) => "image_processing_error",
            AppError::StagedUploadTarget(_) => "staged_upload_target_error",
            AppError::ObjectStoreUpload { .. } => "object_store_upload_error",
            AppError::AssetRegistration(_) => "asset_registration_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
