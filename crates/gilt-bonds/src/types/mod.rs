//! Bond value types.

mod ex_dividend;
mod terms;

pub use ex_dividend::{ExDividendRule, UK_GILT_EX_DIVIDEND_WEEKDAYS};
pub use terms::{BondTerms, CouponAnchor};
