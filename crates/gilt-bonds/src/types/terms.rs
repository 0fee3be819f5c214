//! Static terms of a conventional gilt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gilt_core::Date;

use crate::error::{BondError, BondResult};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Day and month pair on which semi-annual coupons fall, e.g. `7 Jun/Dec`.
///
/// # Example
///
/// ```rust
/// use gilt_bonds::types::CouponAnchor;
///
/// let anchor: CouponAnchor = "7 Jun/Dec".parse().unwrap();
/// assert_eq!(anchor.day, 7);
/// assert_eq!(anchor.months, [6, 12]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponAnchor {
    /// Day of month (1-31).
    pub day: u32,
    /// The two coupon months, ascending.
    pub months: [u32; 2],
}

impl CouponAnchor {
    /// Creates an anchor; the months may be given in either order.
    ///
    /// # Errors
    ///
    /// Returns `BondError::InvalidTerms` for a day outside 1-31, a month
    /// outside 1-12, or two equal months.
    pub fn new(day: u32, first_month: u32, second_month: u32) -> BondResult<Self> {
        if !(1..=31).contains(&day) {
            return Err(BondError::invalid_terms(format!("coupon day {day} out of range")));
        }
        for month in [first_month, second_month] {
            if !(1..=12).contains(&month) {
                return Err(BondError::invalid_terms(format!(
                    "coupon month {month} out of range"
                )));
            }
        }
        if first_month == second_month {
            return Err(BondError::invalid_terms("coupon months must differ"));
        }

        Ok(Self {
            day,
            months: [first_month.min(second_month), first_month.max(second_month)],
        })
    }
}

impl FromStr for CouponAnchor {
    type Err = BondError;

    /// Parses `"<day> <Mon>/<Mon>"`; month names may be abbreviated or full.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognised = || BondError::invalid_terms(format!("unrecognised dividend dates: {s:?}"));

        let (day, months) = s.trim().split_once(char::is_whitespace).ok_or_else(unrecognised)?;
        let day: u32 = day.parse().map_err(|_| unrecognised())?;
        let (first, second) = months.trim().split_once('/').ok_or_else(unrecognised)?;

        let first = month_number(first).ok_or_else(unrecognised)?;
        let second = month_number(second).ok_or_else(unrecognised)?;

        Self::new(day, first, second)
    }
}

impl fmt::Display for CouponAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |m: u32| {
            let abbr = MONTH_ABBREVIATIONS[(m - 1) as usize];
            let mut chars = abbr.chars();
            chars
                .next()
                .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        };
        write!(f, "{} {}/{}", self.day, name(self.months[0]), name(self.months[1]))
    }
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| *full == name)
        .or_else(|| {
            let prefix = name.get(..3)?;
            MONTH_ABBREVIATIONS.iter().position(|abbr| *abbr == prefix)
        })
        .map(|index| index as u32 + 1)
}

/// Static terms of a conventional gilt.
///
/// Coupons are paid semi-annually at half the annual rate. Terms are
/// immutable once built; [`BondTerms::new`] enforces
/// `first_issue_date < redemption_date` and a finite, non-negative coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    /// ISIN code.
    pub isin: String,
    /// Display name, e.g. `4⅛% Treasury Gilt 2027`.
    pub name: String,
    /// Maturity bucket (`Ultra-Short`, `Short`, `Medium`, `Long`).
    pub category: String,
    /// First issue date.
    pub first_issue_date: Date,
    /// Redemption date; also the final coupon date.
    pub redemption_date: Date,
    /// Annual coupon rate in percent.
    pub coupon_rate_percent: f64,
    /// Explicit coupon anchor; when absent, coupons step back from redemption.
    pub dividend_anchor: Option<CouponAnchor>,
}

impl BondTerms {
    /// Creates validated terms with an empty category and no anchor.
    ///
    /// # Errors
    ///
    /// Returns `BondError::InvalidTerms` if the terms are malformed.
    pub fn new(
        isin: impl Into<String>,
        name: impl Into<String>,
        first_issue_date: Date,
        redemption_date: Date,
        coupon_rate_percent: f64,
    ) -> BondResult<Self> {
        let terms = Self {
            isin: isin.into(),
            name: name.into(),
            category: String::new(),
            first_issue_date,
            redemption_date,
            coupon_rate_percent,
            dividend_anchor: None,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the coupon anchor.
    #[must_use]
    pub fn with_dividend_anchor(mut self, anchor: CouponAnchor) -> Self {
        self.dividend_anchor = Some(anchor);
        self
    }

    /// Checks the invariants.
    ///
    /// # Errors
    ///
    /// Returns `BondError::InvalidTerms` on an empty ISIN, a redemption on
    /// or before first issue, or a negative or non-finite coupon.
    pub fn validate(&self) -> BondResult<()> {
        if self.isin.trim().is_empty() {
            return Err(BondError::invalid_terms("ISIN is empty"));
        }
        if self.redemption_date <= self.first_issue_date {
            return Err(BondError::invalid_terms(format!(
                "{}: redemption {} is not after first issue {}",
                self.isin, self.redemption_date, self.first_issue_date
            )));
        }
        if !self.coupon_rate_percent.is_finite() || self.coupon_rate_percent < 0.0 {
            return Err(BondError::invalid_terms(format!(
                "{}: coupon rate {} must be finite and non-negative",
                self.isin, self.coupon_rate_percent
            )));
        }
        Ok(())
    }

    /// Coupon paid each half year per 100 nominal.
    #[must_use]
    pub fn coupon_per_period(&self) -> f64 {
        self.coupon_rate_percent / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_anchor_parse() {
        let anchor: CouponAnchor = "7 Jun/Dec".parse().unwrap();
        assert_eq!(anchor, CouponAnchor::new(7, 6, 12).unwrap());

        let anchor: CouponAnchor = " 22 July/January ".parse().unwrap();
        assert_eq!(anchor.day, 22);
        assert_eq!(anchor.months, [1, 7]);

        let anchor: CouponAnchor = "31 Sept/Mar".parse().unwrap();
        assert_eq!(anchor.months, [3, 9]);
    }

    #[test]
    fn test_anchor_parse_rejects_garbage() {
        assert!("".parse::<CouponAnchor>().is_err());
        assert!("Jun/Dec".parse::<CouponAnchor>().is_err());
        assert!("7 Jun".parse::<CouponAnchor>().is_err());
        assert!("7 Foo/Dec".parse::<CouponAnchor>().is_err());
        assert!("32 Jun/Dec".parse::<CouponAnchor>().is_err());
        assert!("7 Jun/June".parse::<CouponAnchor>().is_err());
    }

    #[test]
    fn test_anchor_display() {
        let anchor = CouponAnchor::new(7, 12, 6).unwrap();
        assert_eq!(anchor.to_string(), "7 Jun/Dec");
    }

    #[test]
    fn test_terms_validation() {
        let terms = BondTerms::new("GB00B16NNR78", "4¼% Treasury Gilt 2027", d(2006, 3, 10), d(2027, 12, 7), 4.25)
            .unwrap()
            .with_category("Short");
        assert_eq!(terms.coupon_per_period(), 2.125);
        assert_eq!(terms.category, "Short");

        assert!(BondTerms::new("GB00B16NNR78", "x", d(2027, 12, 7), d(2027, 12, 7), 4.0).is_err());
        assert!(BondTerms::new("GB00B16NNR78", "x", d(2006, 3, 10), d(2027, 12, 7), -1.0).is_err());
        assert!(BondTerms::new("GB00B16NNR78", "x", d(2006, 3, 10), d(2027, 12, 7), f64::NAN).is_err());
        assert!(BondTerms::new(" ", "x", d(2006, 3, 10), d(2027, 12, 7), 4.0).is_err());
    }

    #[test]
    fn test_zero_coupon_is_valid() {
        assert!(BondTerms::new("GB0000000001", "0% Strip", d(2020, 1, 1), d(2030, 1, 1), 0.0).is_ok());
    }
}
