//! Accrued interest and dirty price.
//!
//! Accrual uses a fixed half-year of 182.5 days regardless of the actual
//! period length or leap years:
//!
//! ```text
//! accrued = (coupon_rate_percent / 2) * days_since_previous / 182.5
//! ```
//!
//! Accrued interest is never negative; during the ex-dividend period the
//! next coupon is dropped from the cashflows instead.

use crate::cashflows::SettlementInfo;

/// Nominal half-year length in days (365 / 2).
pub const HALF_YEAR_DAYS: f64 = 182.5;

/// Accrued interest per 100 nominal.
#[must_use]
pub fn accrued_interest(coupon_rate_percent: f64, days_since_previous: i64) -> f64 {
    let days = days_since_previous.max(0) as f64;
    (coupon_rate_percent / 2.0) * (days / HALF_YEAR_DAYS)
}

/// Accrued interest and dirty price for one settlement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    /// Accrued interest per 100 nominal.
    pub accrued_interest: f64,
    /// Clean price plus accrued interest.
    pub dirty_price: f64,
    /// Carried through from the classifier.
    pub is_ex_dividend_period: bool,
}

impl Accrual {
    /// Computes accrual for `clean_price` at the classified settlement.
    #[must_use]
    pub fn compute(coupon_rate_percent: f64, clean_price: f64, settlement: &SettlementInfo) -> Self {
        let accrued = accrued_interest(coupon_rate_percent, settlement.days_since_previous());
        Self {
            accrued_interest: accrued,
            dirty_price: clean_price + accrued,
            is_ex_dividend_period: settlement.is_ex_dividend_period,
        }
    }
}
