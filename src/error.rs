// src/error.rs

use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and the message shown to the candidate.
#[derive(Debug)]
pub enum AppError {
    // Nothing to take: no exams listed, or the session could not be started
    Unavailable(String),

    // Transport failure (connection refused, timeout, bad body)
    Network(String),

    // Backend answered with a non-success status
    Api { status: u16, message: String },

    // Local cache could not be read or written
    Storage(String),

    // Outgoing payload rejected before it was sent
    Validation(String),

    // Missing or malformed environment configuration
    Config(String),

    // Host refused a capability (e.g. full screen)
    Permission(String),
}

impl AppError {
    /// Reduces the error to the single line shown to the candidate.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unavailable(msg)
            | AppError::Storage(msg)
            | AppError::Validation(msg)
            | AppError::Config(msg)
            | AppError::Permission(msg) => msg.clone(),
            AppError::Network(_) => "Server connection error".to_string(),
            AppError::Api { message, .. } => message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api { status, message } => write!(f, "Api({}): {}", status, message),
            AppError::Network(msg) => write!(f, "Network: {}", msg),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into `AppError::Network`.
/// Allows using `?` operator on HTTP calls.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
