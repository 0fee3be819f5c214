//! Error types for the core crate.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core value types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date construction or parsing.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A cashflow stream would violate its ordering or sign invariants.
    #[error("Invalid cashflow: {reason}")]
    InvalidCashflow {
        /// Description of the invalid cashflow.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid cashflow error.
    #[must_use]
    pub fn invalid_cashflow(reason: impl Into<String>) -> Self {
        Self::InvalidCashflow {
            reason: reason.into(),
        }
    }
}
