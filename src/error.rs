//! Domain-specific error types for hemerton

use thiserror::Error;

/// Main error type for the hemerton CLI
#[derive(Error, Debug)]
pub enum HemertonError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid form: {message}")]
    InvalidForm { message: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    /// The user cancelled a form. Reported as a plain abort, not as a failure.
    #[error("Interrupted by user")]
    Interrupted,

    /// A workflow needs existing on-chain records and found none.
    #[error("{message}")]
    RequiredContextEmpty { message: String },

    #[error("Cannot convert '{field}': {message}")]
    TypeCoercion { field: String, message: String },

    #[error("Transaction submission failed: {message}")]
    Submission { message: String },

    #[error("Chain RPC error: {message}")]
    Http { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl HemertonError {
    /// Process exit code for this error when it ends a command.
    pub fn exit_code(&self) -> i32 {
        match self {
            HemertonError::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for HemertonError {
    fn from(err: std::io::Error) -> Self {
        HemertonError::Terminal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HemertonError {
    fn from(err: serde_json::Error) -> Self {
        HemertonError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for HemertonError {
    fn from(err: reqwest::Error) -> Self {
        HemertonError::Http {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for HemertonError {
    fn from(err: toml::de::Error) -> Self {
        HemertonError::Config {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for HemertonError {
    fn from(err: regex::Error) -> Self {
        HemertonError::Config {
            message: format!("Invalid validation pattern: {}", err),
        }
    }
}

/// Result type alias for hemerton operations
pub type Result<T> = std::result::Result<T, HemertonError>;
