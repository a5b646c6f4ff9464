use std::collections::HashMap;

use super::error::AuditError;
use super::models::AuditMessages;
use crate::config::AuditConfig;

/// Names of the audited operations
pub mod operations {
    /// Registering a manager on a todo
    pub const SAVE_MANAGER: &str = "save_manager";
}

/// Per-operation audit messages, built once at startup
///
/// Operations without an entry fall back to the default messages.
#[derive(Debug, Clone, Default)]
pub struct AuditRegistry {
    defaults: AuditMessages,
    operations: HashMap<&'static str, AuditMessages>,
}

impl AuditRegistry {
    pub fn new(defaults: AuditMessages) -> Self {
        Self {
            defaults,
            operations: HashMap::new(),
        }
    }

    pub fn register(mut self, operation: &'static str, messages: AuditMessages) -> Self {
        self.operations.insert(operation, messages);
        self
    }

    /// Build the registry from configuration, rejecting blank messages
    pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        config.defaults.validate()?;
        config.save_manager.validate()?;

        Ok(Self::new(config.defaults.clone())
            .register(operations::SAVE_MANAGER, config.save_manager.clone()))
    }

    pub fn messages(&self, operation: &str) -> &AuditMessages {
        self.operations.get(operation).unwrap_or(&self.defaults)
    }
}
