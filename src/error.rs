//! Error types for the den-remote server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type alias for den-remote operations
pub type Result<T> = std::result::Result<T, DenError>;

/// Error types for device control and request handling
#[derive(Error, Debug)]
pub enum DenError {
    /// Invalid client input (unknown action, out-of-range value, bad body)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client exceeded its request budget for the current window
    #[error("Too many requests: {0}")]
    RateLimited(String),

    /// External operation missed its deadline
    #[error("Operation timed out")]
    Timeout,

    /// Device rejected or failed the command
    #[error("Device control error: {0}")]
    DeviceControl(String),

    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl DenError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a rate limited error
    pub fn rate_limited<S: Into<String>>(msg: S) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a device control error
    pub fn device_control<S: Into<String>>(msg: S) -> Self {
        Self::DeviceControl(msg.into())
    }

    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error was caused by the client rather than a device
    pub fn is_client_error(&self) -> bool {
        matches!(self, DenError::InvalidInput(_) | DenError::RateLimited(_))
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            DenError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DenError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DenError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        DenError::WebSocket(err.to_string())
    }
}

impl IntoResponse for DenError {
    fn into_response(self) -> Response {
        // Client-facing errors carry their message verbatim; everything else
        // keeps the taxonomy prefix so log lines and response bodies match.
        let message = match &self {
            DenError::InvalidInput(msg) | DenError::RateLimited(msg) => msg.clone(),
            other => other.to_string(),
        };
        (self.status_code(), Json(json!({ "error": message }))).into_response()
    }
}
