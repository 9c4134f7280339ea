//! Error definitions
//!
//! This module provides error types for testkit-scheduler.

use thiserror::Error;

/// Main error type for testkit-scheduler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A bounded wait elapsed before the future was finalized
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The future was cancelled before a value was supplied
    #[error("Future was cancelled")]
    Cancelled,

    /// The future was failed explicitly by test code
    #[error("Future failed: {0}")]
    Failed(String),
}

impl Error {
    /// Create a failure error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Returns `true` if this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this reports a cancelled future.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
