use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::error::AuditError;
use super::models::{AuditRecord, NewAuditRecord};
use super::store::AuditStore;

/// Persists one audit record per call, each in its own unit of work
///
/// There are no retries: a failed append is returned to the caller as is.
#[derive(Clone)]
pub struct AuditWriter {
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record a successful invocation; the stored message is `message` verbatim.
    pub async fn record_success(
        &self,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<AuditRecord, AuditError> {
        let record = self.store.append(NewAuditRecord::new(message, at)).await?;
        debug!(audit_id = record.id, "Recorded success audit");
        Ok(record)
    }

    /// Record a failed invocation as `"{message}: {error_detail}"`.
    pub async fn record_failure(
        &self,
        message: &str,
        error_detail: &str,
        at: DateTime<Utc>,
    ) -> Result<AuditRecord, AuditError> {
        let composed = format!("{}: {}", message, error_detail);
        let record = self.store.append(NewAuditRecord::new(composed, at)).await?;
        debug!(audit_id = record.id, "Recorded failure audit");
        Ok(record)
    }
}
