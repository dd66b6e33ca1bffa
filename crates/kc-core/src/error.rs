//! Error handling for the role storage crates.
//!
//! Error messages are informative for operators but never carry
//! credentials (database passwords are redacted before formatting).

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported database driver or dialect.
    #[error("unsupported database driver: {0}")]
    UnsupportedDriver(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns whether this error comes from configuration resolution.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnsupportedDriver(_))
    }
}
