//! Error types for Finassist core.

use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
