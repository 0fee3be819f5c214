//! Domain value types.
//!
//! - [`Date`]: calendar date for settlement and payment dates
//! - [`Cashflow`]: a signed amount per 100 nominal on a date
//! - [`CashflowSet`]: settlement outflow followed by dated inflows

mod cashflow;
mod date;

pub use cashflow::{Cashflow, CashflowSet};
pub use date::Date;
