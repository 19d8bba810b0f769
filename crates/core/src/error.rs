//! Error types for promptctl.
//!
//! One enum covers every failure the client can surface: malformed
//! templates, input-binding mismatches, configuration problems, and
//! failures talking to the remote prompt engine.

use thiserror::Error;

/// Unified error type for promptctl.
///
/// Every fallible function returns `Result<T, AppError>`. Nothing is retried
/// or swallowed locally; errors travel to the immediate caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed template descriptor or engine handle
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required input has no value and no default
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// A value was supplied for an input the template does not declare
    #[error("Unknown input: {0}")]
    UnknownInput(String),

    /// Configuration-related errors (including missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or remote-service failure
    #[error("Engine request failed: {0}")]
    EngineRequest(String),

    /// Template file loading errors
    #[error("Template error: {0}")]
    Template(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
