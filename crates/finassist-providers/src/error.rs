//! Error types for the remote assistant backend.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Backend error types.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication error (invalid API key, etc.).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Error response from the remote API.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local file open/read failure.
    #[error("File error for {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run completed without an assistant text message.
    #[error("No response from assistant")]
    NoResponse,

    /// A run transitioned to a failed status.
    #[error("Run failed: {0}")]
    RunFailed(String),

    /// Run polling exceeded the configured maximum wait.
    #[error("Run did not finish within {0} ms")]
    Timeout(u64),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a file error.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Create a run failure error.
    pub fn run_failed(message: impl Into<String>) -> Self {
        Self::RunFailed(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
