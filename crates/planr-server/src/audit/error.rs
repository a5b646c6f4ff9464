use thiserror::Error;

/// Failures on the audit path itself
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit write failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Audit store unavailable: {0}")]
    Unavailable(String),

    #[error("Audited task interrupted: {0}")]
    Interrupted(String),

    #[error("Invalid audit messages: {0}")]
    InvalidMessages(String),
}
