//! Coupon schedule generation.
//!
//! Two ways to derive the dates:
//! - Walk back from redemption in six-month steps until first issue is
//!   reached or passed. Each step is taken from redemption directly so
//!   month-end clamping does not drift.
//! - With an explicit [`CouponAnchor`], take every calendar-valid anchor
//!   date between first issue and redemption, then append redemption.
//!
//! No stub adjustment is made: an irregular first period is kept as is.
//!
//! # Example
//!
//! ```rust
//! use gilt_bonds::cashflows::CouponSchedule;
//! use gilt_bonds::types::BondTerms;
//! use gilt_core::Date;
//!
//! let terms = BondTerms::new(
//!     "GB00TEST0001",
//!     "4% Treasury Gilt 2027",
//!     Date::from_ymd(2025, 1, 20).unwrap(),
//!     Date::from_ymd(2027, 6, 7).unwrap(),
//!     4.0,
//! )
//! .unwrap();
//!
//! let schedule = CouponSchedule::build(&terms).unwrap();
//! assert_eq!(schedule.len(), 5);
//! assert_eq!(schedule.first(), Date::from_ymd(2025, 6, 7).unwrap());
//! ```

use serde::Serialize;

use gilt_core::Date;

use crate::error::{BondError, BondResult};
use crate::types::{BondTerms, CouponAnchor};

/// Months between coupons.
const MONTHS_PER_PERIOD: i32 = 6;

/// Ordered coupon dates for one bond, ending at redemption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponSchedule {
    first_issue_date: Date,
    redemption_date: Date,
    dates: Vec<Date>,
}

impl CouponSchedule {
    /// Builds the schedule for `terms`.
    ///
    /// # Errors
    ///
    /// Returns `BondError::InvalidTerms` if redemption is not after first
    /// issue, or a generated date is out of range.
    pub fn build(terms: &BondTerms) -> BondResult<Self> {
        let first_issue = terms.first_issue_date;
        let redemption = terms.redemption_date;

        if redemption <= first_issue {
            return Err(BondError::invalid_terms(format!(
                "{}: redemption {redemption} is not after first issue {first_issue}",
                terms.isin
            )));
        }

        let dates = match terms.dividend_anchor {
            Some(anchor) => anchored_dates(anchor, first_issue, redemption),
            None => backward_dates(first_issue, redemption)?,
        };

        Ok(Self {
            first_issue_date: first_issue,
            redemption_date: redemption,
            dates,
        })
    }

    /// Returns all coupon dates, ascending.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns the first coupon date.
    #[must_use]
    pub fn first(&self) -> Date {
        self.dates.first().copied().unwrap_or(self.redemption_date)
    }

    /// Returns the first issue date the schedule was built from.
    #[must_use]
    pub fn first_issue_date(&self) -> Date {
        self.first_issue_date
    }

    /// Returns the redemption date, which is also the last coupon date.
    #[must_use]
    pub fn redemption_date(&self) -> Date {
        self.redemption_date
    }

    /// Returns the number of coupon dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if there are no coupon dates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Latest coupon date on or before `date`.
    #[must_use]
    pub fn previous_on_or_before(&self, date: Date) -> Option<Date> {
        let idx = self.dates.partition_point(|d| *d <= date);
        idx.checked_sub(1).map(|i| self.dates[i])
    }

    /// Earliest coupon date strictly after `date`.
    #[must_use]
    pub fn next_after(&self, date: Date) -> Option<Date> {
        let idx = self.dates.partition_point(|d| *d <= date);
        self.dates.get(idx).copied()
    }

    /// Coupon dates strictly after `date`.
    #[must_use]
    pub fn after(&self, date: Date) -> &[Date] {
        let idx = self.dates.partition_point(|d| *d <= date);
        &self.dates[idx..]
    }
}

fn backward_dates(first_issue: Date, redemption: Date) -> BondResult<Vec<Date>> {
    let mut dates = Vec::new();
    let mut periods = 0;

    loop {
        let date = redemption.add_months(-MONTHS_PER_PERIOD * periods)?;
        if date < first_issue {
            break;
        }
        dates.push(date);
        periods += 1;
    }

    dates.reverse();
    Ok(dates)
}

fn anchored_dates(anchor: CouponAnchor, first_issue: Date, redemption: Date) -> Vec<Date> {
    let mut dates: Vec<Date> = (first_issue.year()..=redemption.year())
        .flat_map(|year| {
            anchor
                .months
                .into_iter()
                .filter_map(move |month| Date::from_ymd(year, month, anchor.day).ok())
        })
        .filter(|d| first_issue <= *d && *d <= redemption)
        .collect();

    dates.push(redemption);
    dates.sort_unstable();
    dates.dedup();
    dates
}
