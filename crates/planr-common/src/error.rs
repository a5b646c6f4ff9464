//! Error types shared across Planr crates

use thiserror::Error;

/// Result type alias for Planr operations
pub type Result<T> = std::result::Result<T, PlanrError>;

/// Errors raised while bootstrapping shared infrastructure
#[derive(Error, Debug)]
pub enum PlanrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

impl PlanrError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
