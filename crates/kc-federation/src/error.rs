//! Federation error types.

use kc_storage::StorageError;
use thiserror::Error;

/// Errors that can occur during federation operations.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Identifier does not follow the `f:{component}:{external}` format.
    #[error("Malformed storage identifier: {0}")]
    MalformedIdentity(String),

    /// Operation not supported by externally stored roles.
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Host model lookup failed.
    #[error("Host model error: {0}")]
    Host(String),

    /// Storage error from the persistence gateway.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal error.
    #[error("Internal federation error: {0}")]
    Internal(String),
}

impl FederationError {
    /// Creates a malformed identity error.
    #[must_use]
    pub fn malformed_identity(id: impl Into<String>) -> Self {
        Self::MalformedIdentity(id.into())
    }

    /// Creates a not supported error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported(operation.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a host model error.
    #[must_use]
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Checks if this is an unsupported operation error.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Checks if this is a malformed identity error.
    #[must_use]
    pub const fn is_malformed_identity(&self) -> bool {
        matches!(self, Self::MalformedIdentity(_))
    }

    /// Checks if this wraps a unique constraint violation.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_duplicate())
    }
}

impl From<kc_core::Error> for FederationError {
    fn from(err: kc_core::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
