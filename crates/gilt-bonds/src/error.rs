//! Error types for gilt valuation.

use thiserror::Error;

use gilt_core::{CoreError, Date};

/// A specialized Result type for bond operations.
pub type BondResult<T> = Result<T, BondError>;

/// Errors that can occur while valuing a gilt.
///
/// Every variant is recoverable; callers facing end users should render
/// [`BondError::kind`] rather than the display string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BondError {
    /// Malformed bond definition.
    #[error("Invalid bond terms: {reason}")]
    InvalidTerms {
        /// Description of what's invalid.
        reason: String,
    },

    /// The ISIN is not in the directory.
    #[error("Unknown ISIN: {isin}")]
    UnknownIsin {
        /// The ISIN that was looked up.
        isin: String,
    },

    /// Settlement precedes the first issue date.
    #[error("Settlement date {settlement} is before first issue {first_issue}")]
    PriorToIssue {
        /// Settlement date.
        settlement: Date,
        /// First issue date.
        first_issue: Date,
    },

    /// Settlement is on or after redemption.
    #[error("Settlement date {settlement} is on or after redemption {redemption}")]
    Matured {
        /// Settlement date.
        settlement: Date,
        /// Redemption date.
        redemption: Date,
    },

    /// Price, tax rate or date out of range.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// The yield solver could not find a root.
    #[error("Yield did not converge: {reason}")]
    NoConvergence {
        /// Description of the failure.
        reason: String,
    },

    /// Tax rate of 100% or more has no gross equivalent.
    #[error("Degenerate tax rate: {tax_rate}")]
    DegenerateTaxRate {
        /// The rejected tax rate.
        tax_rate: f64,
    },

    /// Core library error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl BondError {
    /// Creates an invalid terms error.
    #[must_use]
    pub fn invalid_terms(reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            reason: reason.into(),
        }
    }

    /// Creates an unknown ISIN error.
    #[must_use]
    pub fn unknown_isin(isin: impl Into<String>) -> Self {
        Self::UnknownIsin { isin: isin.into() }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a no convergence error.
    #[must_use]
    pub fn no_convergence(reason: impl Into<String>) -> Self {
        Self::NoConvergence {
            reason: reason.into(),
        }
    }

    /// Returns a stable machine-readable code for the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTerms { .. } | Self::Core(_) => "invalid_terms",
            Self::UnknownIsin { .. } => "unknown_isin",
            Self::PriorToIssue { .. } => "prior_to_issue",
            Self::Matured { .. } => "matured",
            Self::InvalidInput { .. } => "invalid_input",
            Self::NoConvergence { .. } => "no_convergence",
            Self::DegenerateTaxRate { .. } => "degenerate_tax_rate",
        }
    }
}
