//! Error types for provisioning operations

use thiserror::Error;

/// Main error type for provisioning operations
///
/// Remote-call failures are surfaced unchanged to the invoking workflow,
/// which owns retry and task-state handling. Nothing here is retried.
/// Lookup misses are not errors; they resolve to empty values instead.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Connection to manager failed: {0}")]
    Connect(String),

    #[error("Authentication with manager failed: {0}")]
    Auth(String),

    #[error("Remote call {operation} failed: {message}")]
    Remote { operation: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProvisionError {
    /// Build a remote-call error with operation context
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProvisionError::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
