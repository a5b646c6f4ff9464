//! Around-wrapper that audits every invocation of an operation

use chrono::{DateTime, SubsecRound, Utc};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info};

use super::classifier::{classify, AuditArg, AuditRoles};
use super::error::AuditError;
use super::models::{AuditMessages, AuditRecord};
use super::registry::AuditRegistry;
use super::writer::AuditWriter;

/// Outcome of an intercepted call that did not produce a value
///
/// `Operation` carries the wrapped operation's own error, untouched.
/// `Audit` means the audit record could not be written; on the failure path
/// it replaces the operation error, which is logged instead.
#[derive(Debug)]
pub enum Intercepted<E> {
    Operation(E),
    Audit(AuditError),
}

impl<E> Intercepted<E> {
    pub fn operation(self) -> Option<E> {
        match self {
            Intercepted::Operation(err) => Some(err),
            Intercepted::Audit(_) => None,
        }
    }

    pub fn is_audit(&self) -> bool {
        matches!(self, Intercepted::Audit(_))
    }
}

impl<E> From<AuditError> for Intercepted<E> {
    fn from(err: AuditError) -> Self {
        Intercepted::Audit(err)
    }
}

impl<E: fmt::Display> fmt::Display for Intercepted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intercepted::Operation(err) => err.fmt(f),
            Intercepted::Audit(err) => err.fmt(f),
        }
    }
}

impl<E> std::error::Error for Intercepted<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Intercepted::Operation(err) => Some(err),
            Intercepted::Audit(err) => Some(err),
        }
    }
}

/// Per-call state, owned by a single interception
#[derive(Debug, Clone)]
pub struct InvocationContext<'m> {
    pub started_at: DateTime<Utc>,
    pub messages: &'m AuditMessages,
    pub roles: AuditRoles,
}

impl<'m> InvocationContext<'m> {
    /// Timestamps are kept at microsecond precision, the resolution of
    /// `TIMESTAMPTZ`, so stored and returned records agree.
    fn begin(messages: &'m AuditMessages, roles: AuditRoles) -> Self {
        Self {
            started_at: Utc::now().trunc_subsecs(6),
            messages,
            roles,
        }
    }
}

/// Audits every call it wraps with exactly one record
///
/// The record is written after the operation finishes and before control
/// returns to the caller. The operation's value or error is handed back
/// unchanged unless the audit write itself fails.
///
/// The futures returned by [`audit`], [`wrap`] and [`wrap_with_roles`] are
/// not cancel-safe: dropping one after the operation has committed but before
/// the write finishes leaves no record. Callers that can be dropped (HTTP
/// handlers on client disconnect or shutdown) use [`audit_detached`].
///
/// [`audit`]: AuditInterceptor::audit
/// [`wrap`]: AuditInterceptor::wrap
/// [`wrap_with_roles`]: AuditInterceptor::wrap_with_roles
/// [`audit_detached`]: AuditInterceptor::audit_detached
#[derive(Clone)]
pub struct AuditInterceptor {
    writer: AuditWriter,
    registry: Arc<AuditRegistry>,
}

impl AuditInterceptor {
    pub fn new(writer: AuditWriter, registry: Arc<AuditRegistry>) -> Self {
        Self { writer, registry }
    }

    /// Wrap `operation` using the messages registered for `name`
    pub async fn audit<T, E, F, Fut>(
        &self,
        name: &str,
        args: &[AuditArg<'_>],
        operation: F,
    ) -> Result<T, Intercepted<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.wrap(self.registry.messages(name), args, operation).await
    }

    /// Run the whole interception on its own task
    ///
    /// Once spawned, the operation and its audit write run to completion even
    /// if the returned future is dropped. A panic in the operation is resumed
    /// on the caller after the failure record is written.
    pub async fn audit_detached<T, E, F, Fut>(
        &self,
        name: &'static str,
        roles: AuditRoles,
        operation: F,
    ) -> Result<T, Intercepted<E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + Sync + 'static,
    {
        let interceptor = self.clone();

        let task = tokio::spawn(async move {
            let messages = interceptor.registry.messages(name);
            interceptor.wrap_with_roles(messages, roles, operation).await
        });

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => {
                error!(operation = name, error = %err, "Audited task did not complete");
                Err(Intercepted::Audit(AuditError::Interrupted(err.to_string())))
            },
        }
    }

    /// Wrap `operation`, resolving roles from heterogeneous call arguments
    pub async fn wrap<T, E, F, Fut>(
        &self,
        messages: &AuditMessages,
        args: &[AuditArg<'_>],
        operation: F,
    ) -> Result<T, Intercepted<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.wrap_with_roles(messages, classify(args), operation).await
    }

    /// Wrap `operation` with roles the caller already knows
    pub async fn wrap_with_roles<T, E, F, Fut>(
        &self,
        messages: &AuditMessages,
        roles: AuditRoles,
        operation: F,
    ) -> Result<T, Intercepted<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let ctx = InvocationContext::begin(messages, roles);

        let outcome = AssertUnwindSafe(async move { operation().await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                self.on_success(&ctx).await?;
                Ok(value)
            },
            Ok(Err(err)) => {
                self.on_failure(&ctx, &err).await?;
                Err(Intercepted::Operation(err))
            },
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                // A failed write is already logged; the panic takes precedence
                let _ = self.on_failure(&ctx, &detail).await;
                panic::resume_unwind(payload)
            },
        }
    }

    async fn on_success(&self, ctx: &InvocationContext<'_>) -> Result<AuditRecord, AuditError> {
        let record = self
            .writer
            .record_success(&ctx.messages.success_message, ctx.started_at)
            .await
            .inspect_err(|e| {
                error!(
                    error = %e,
                    message = %ctx.messages.success_message,
                    "Audit write failed after successful operation"
                );
            })?;

        info!(
            audit_id = record.id,
            actor = %ctx.roles.actor(),
            subject = %ctx.roles.subject(),
            target = %ctx.roles.target(),
            time = %ctx.started_at,
            "Success: {}",
            ctx.messages.success_message
        );

        Ok(record)
    }

    async fn on_failure<E: fmt::Display>(
        &self,
        ctx: &InvocationContext<'_>,
        err: &E,
    ) -> Result<AuditRecord, AuditError> {
        let detail = err.to_string();

        let record = self
            .writer
            .record_failure(&ctx.messages.failure_message, &detail, ctx.started_at)
            .await
            .inspect_err(|e| {
                error!(
                    error = %e,
                    operation_error = %detail,
                    message = %ctx.messages.failure_message,
                    "Audit write failed after failed operation"
                );
            })?;

        error!(
            audit_id = record.id,
            actor = %ctx.roles.actor(),
            subject = %ctx.roles.subject(),
            target = %ctx.roles.target(),
            time = %ctx.started_at,
            error = %detail,
            "Failure: {}",
            ctx.messages.failure_message
        );

        Ok(record)
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());

    format!("panicked: {}", reason)
}
