//! Ex-dividend rule.
//!
//! During the ex-dividend period the bond trades without the right to
//! receive the next coupon: the seller keeps it.

use serde::{Deserialize, Serialize};

use gilt_core::Date;

/// Number of weekdays before a coupon date at which a gilt goes ex-dividend.
pub const UK_GILT_EX_DIVIDEND_WEEKDAYS: u32 = 7;

/// Rule for locating the ex-dividend window before a coupon.
///
/// Days are counted back from the coupon date skipping Saturdays and
/// Sundays. Public holidays are not recognised.
///
/// # Example
///
/// ```rust
/// use gilt_bonds::types::ExDividendRule;
/// use gilt_core::Date;
///
/// let rule = ExDividendRule::uk_gilt();
/// let coupon = Date::from_ymd(2025, 6, 7).unwrap();
/// assert_eq!(rule.ex_dividend_date(coupon), Date::from_ymd(2025, 5, 29).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExDividendRule {
    /// Weekdays before the coupon date.
    pub weekdays: u32,
}

impl Default for ExDividendRule {
    fn default() -> Self {
        Self::uk_gilt()
    }
}

impl ExDividendRule {
    /// Seven weekdays, as for UK gilts.
    #[must_use]
    pub const fn uk_gilt() -> Self {
        Self {
            weekdays: UK_GILT_EX_DIVIDEND_WEEKDAYS,
        }
    }

    /// Creates a rule with a custom window length.
    #[must_use]
    pub const fn custom(weekdays: u32) -> Self {
        Self { weekdays }
    }

    /// First date of the ex-dividend window for `coupon_date`.
    #[must_use]
    pub fn ex_dividend_date(&self, coupon_date: Date) -> Date {
        coupon_date.add_business_days(-(self.weekdays as i32))
    }

    /// True if `settlement` falls in `[ex_dividend_date, coupon_date)`.
    #[must_use]
    pub fn is_ex_dividend(&self, settlement: Date, coupon_date: Date) -> bool {
        self.ex_dividend_date(coupon_date) <= settlement && settlement < coupon_date
    }
}

impl std::fmt::Display for ExDividendRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} weekdays before coupon", self.weekdays)
    }
}
