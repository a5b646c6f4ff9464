//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuditError;

/// Message recorded on success when an operation has no specific message
pub const DEFAULT_SUCCESS_MESSAGE: &str = "success";

/// Message prefix recorded on failure when an operation has no specific message
pub const DEFAULT_FAILURE_MESSAGE: &str = "failure";

/// Default number of audit records returned per query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit records that can be returned in a single query.
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// A persisted audit record. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditRecord {
    /// Assigned by the store
    pub id: i64,
    pub message: String,
    /// Captured when the intercepted call started, not when it was persisted
    pub created_at: DateTime<Utc>,
}

/// Insert payload for [`AuditRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewAuditRecord {
    pub fn new(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            created_at,
        }
    }
}

/// Success and failure messages configured for one audited operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMessages {
    pub success_message: String,
    pub failure_message: String,
}

impl AuditMessages {
    pub fn new(success_message: impl Into<String>, failure_message: impl Into<String>) -> Self {
        Self {
            success_message: success_message.into(),
            failure_message: failure_message.into(),
        }
    }

    /// Both messages must contain something other than whitespace
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.success_message.trim().is_empty() {
            return Err(AuditError::InvalidMessages(
                "success message cannot be empty".to_string(),
            ));
        }
        if self.failure_message.trim().is_empty() {
            return Err(AuditError::InvalidMessages(
                "failure message cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AuditMessages {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_MESSAGE, DEFAULT_FAILURE_MESSAGE)
    }
}

/// Query parameters for reading the audit trail
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_AUDIT_QUERY_LIMIT
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl AuditQuery {
    /// Limit clamped to `1..=MAX_AUDIT_QUERY_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_AUDIT_QUERY_LIMIT)
    }
}
