use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize)]
pub enum AppError {
    /// The configured API base URL does not parse as an absolute URL.
    /// Surfaced before any network attempt.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Network Error: {0}")]
    Network(String),

    /// Response body did not match the expected chat-completion shape.
    #[error("Decode Error: {0}")]
    Decode(String),

    /// Non-2xx HTTP status with the body the endpoint returned.
    #[error("API Error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("System Error: {0}")]
    System(String),
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidEndpoint(err.to_string())
    }
}

// Helper for Tauri Result
pub type AppResult<T> = Result<T, AppError>;
