//! # Gilt Core
//!
//! Foundational types shared by the gilt valuation crates:
//!
//! - **Date**: calendar date newtype with weekday arithmetic
//! - **Cashflow**: signed, dated amounts per 100 nominal
//! - **CashflowSet**: an ordered stream opening with the settlement outflow
//!
//! ## Example
//!
//! ```rust
//! use gilt_core::prelude::*;
//!
//! let settle = Date::from_ymd(2025, 3, 7).unwrap();
//! let mut flows = CashflowSet::new(settle, 101.25).unwrap();
//! flows.push(Date::from_ymd(2025, 9, 7).unwrap(), 2.0).unwrap();
//! assert_eq!(flows.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Cashflow, CashflowSet, Date};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{Cashflow, CashflowSet, Date};
