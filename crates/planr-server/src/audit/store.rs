//! Append-only audit storage

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

use super::error::AuditError;
use super::models::{AuditQuery, AuditRecord, NewAuditRecord};
use crate::db;

/// Storage backend for audit records
///
/// Only appends and reads are exposed; records are never updated or removed.
/// `append` must be atomic per record and must commit on its own, independent
/// of any unit of work the caller has open.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist `record` and return it with its assigned id.
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError>;

    /// Most recent records first.
    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError>;
}

/// PostgreSQL-backed store writing to the `log` table
#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
        let saved = db::in_new_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuditRecord>(
                    r#"
                    INSERT INTO log (message, created_at)
                    VALUES ($1, $2)
                    RETURNING id, message, created_at
                    "#,
                )
                .bind(&record.message)
                .bind(record.created_at)
                .fetch_one(&mut **tx)
                .await
                .map_err(AuditError::from)
            })
        })
        .await?;

        debug!(audit_id = saved.id, "Appended audit record");

        Ok(saved)
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError> {
        let records = sqlx::query_as::<_, AuditRecord>(
            r#"
            SELECT id, message, created_at
            FROM log
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(query.effective_limit())
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Queried audit records");

        Ok(records)
    }
}

/// In-process store for tests and database-less local runs
///
/// Ids are assigned sequentially starting at 1. [`set_unavailable`] makes
/// every subsequent append fail, which simulates a storage outage.
///
/// [`set_unavailable`]: MemoryAuditStore::set_unavailable
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
    unavailable: AtomicBool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all records in insertion order
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("memory store is offline".to_string()));
        }

        let mut records = self
            .records
            .lock()
            .map_err(|_| AuditError::Unavailable("memory store lock poisoned".to_string()))?;

        let saved = AuditRecord {
            id: records.len() as i64 + 1,
            message: record.message,
            created_at: record.created_at,
        };
        records.push(saved.clone());

        Ok(saved)
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError> {
        let mut records = self.records();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records.truncate(query.effective_limit() as usize);
        Ok(records)
    }
}
