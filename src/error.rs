//! Error types for Crucible
//!
//! ## Table of Contents
//! - **CrucibleError**: Main error enum covering all failure modes
//! - **Result**: Type alias for `Result<T, CrucibleError>`

use thiserror::Error;

/// Result type alias for Crucible operations
pub type Result<T> = std::result::Result<T, CrucibleError>;

/// Main error type for Crucible operations
///
/// The research cycle itself has no error path: allocation, analysis and
/// explanation degrade to empty or partial results on degenerate input.
/// Errors exist only at construction time (invalid configuration) and at
/// the I/O boundaries (law-file generation, telemetry export).
#[derive(Error, Debug)]
pub enum CrucibleError {
    /// Configuration error during session or component construction
    #[error("configuration error: {0}")]
    Config(String),

    /// Metrics collection or telemetry export failure
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Explainability model or pattern registry failure
    #[error("explanation error: {0}")]
    Explanation(String),

    /// Law-file generation failure
    #[error("law generation error: {0}")]
    LawGen(String),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CrucibleError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a metrics error
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::Metrics(msg.into())
    }

    /// Create an explanation error
    pub fn explanation(msg: impl Into<String>) -> Self {
        Self::Explanation(msg.into())
    }

    /// Create a law generation error
    pub fn lawgen(msg: impl Into<String>) -> Self {
        Self::LawGen(msg.into())
    }
}

impl From<prometheus::Error> for CrucibleError {
    fn from(err: prometheus::Error) -> Self {
        Self::Metrics(err.to_string())
    }
}
