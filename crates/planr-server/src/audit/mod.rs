//! Audit interception
//!
//! Wraps selected state-changing operations so that every invocation, whether
//! it succeeds or fails, leaves exactly one record in the `log` table. The
//! record is written in its own transaction, so it survives a rollback of the
//! business transaction that triggered it.
//!
//! # Architecture
//!
//! - [`AuditStore`]: append-only storage (`PgAuditStore`, `MemoryAuditStore`)
//! - [`AuditWriter`]: one independent unit of work per record
//! - [`classify`]: maps call arguments to actor / subject / target ids
//! - [`AuditInterceptor`]: the around-wrapper tying the three together
//! - [`AuditRegistry`]: per-operation success/failure messages
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use planr_server::audit::{
//!     AuditArg, AuditInterceptor, AuditRegistry, AuditWriter, MemoryAuditStore,
//! };
//!
//! # async fn example() {
//! let store = Arc::new(MemoryAuditStore::new());
//! let interceptor = AuditInterceptor::new(
//!     AuditWriter::new(store.clone()),
//!     Arc::new(AuditRegistry::default()),
//! );
//!
//! let todo_id = 5_i64;
//! let result: Result<u32, _> = interceptor
//!     .audit("save_manager", &[AuditArg::from(todo_id)], || async {
//!         Ok::<_, std::io::Error>(42)
//!     })
//!     .await;
//! # }
//! ```

mod classifier;
mod error;
mod interceptor;
mod models;
mod registry;
mod store;
mod writer;

pub use classifier::{
    classify, ActorIdentity, AuditArg, AuditRoles, RoleId, SubjectRequest, UNKNOWN,
};
pub use error::AuditError;
pub use interceptor::{AuditInterceptor, Intercepted, InvocationContext};
pub use models::{
    AuditMessages, AuditQuery, AuditRecord, NewAuditRecord, DEFAULT_AUDIT_QUERY_LIMIT,
    DEFAULT_FAILURE_MESSAGE, DEFAULT_SUCCESS_MESSAGE, MAX_AUDIT_QUERY_LIMIT,
};
pub use registry::{operations, AuditRegistry};
pub use store::{AuditStore, MemoryAuditStore, PgAuditStore};
pub use writer::AuditWriter;
