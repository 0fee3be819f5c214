//! # Gilt Bonds
//!
//! Valuation and yield engine for conventional UK gilts.
//!
//! This crate provides:
//!
//! - **Types**: bond terms, coupon anchors, the ex-dividend rule
//! - **Cash Flows**: coupon schedules, settlement classification, accrued
//!   interest, forward cashflow projection with ex-dividend exclusion and tax
//! - **Pricing**: effective annual yield (XIRR) by safeguarded Newton search
//! - **Valuation**: the single entry point producing pre-tax, post-tax and
//!   gross-equivalent yields
//!
//! ## Example
//!
//! ```rust
//! use gilt_bonds::prelude::*;
//! use gilt_core::Date;
//!
//! let terms = BondTerms::new(
//!     "GB00B16NNR78",
//!     "4¼% Treasury Gilt 2027",
//!     Date::from_ymd(2006, 3, 10).unwrap(),
//!     Date::from_ymd(2027, 12, 7).unwrap(),
//!     4.25,
//! )
//! .unwrap();
//!
//! let ctx = SettlementContext::new(Date::from_ymd(2025, 3, 3).unwrap(), 99.5, 0.4);
//! let result = value(&terms, &ctx).unwrap();
//!
//! assert!(result.dirty_price_per_100 > 99.5);
//! assert!(result.gross_equivalent_yield > result.post_tax_return);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod cashflows;
pub mod error;
pub mod pricing;
pub mod types;
pub mod valuation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cashflows::{classify_settlement, CouponSchedule, SettlementInfo};
    pub use crate::error::{BondError, BondResult};
    pub use crate::pricing::{YieldResult, YieldSolver};
    pub use crate::types::{BondTerms, CouponAnchor, ExDividendRule};
    pub use crate::valuation::{
        gross_equivalent_yield, value, value_with_schedule, GiltValuer, SettlementContext,
        ValuationResult,
    };
}

pub use error::{BondError, BondResult};
