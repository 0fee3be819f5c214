//! Dated cashflows per 100 nominal.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Date;
use crate::error::{CoreError, CoreResult};

/// A dated, signed amount per 100 nominal.
///
/// Negative amounts are outflows (the purchase), positive amounts inflows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Payment date
    date: Date,
    /// Amount per 100 nominal
    amount: f64,
}

impl Cashflow {
    /// Creates a new cashflow.
    #[must_use]
    pub fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Returns the payment date.
    #[must_use]
    pub fn date(&self) -> Date {
        self.date
    }

    /// Returns the signed amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl fmt::Display for Cashflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6}", self.date, self.amount)
    }
}

/// An ordered cashflow stream as seen by a purchaser.
///
/// The first element is always the settlement outflow and is the only
/// negative entry. Later entries are strictly increasing in date; pushing
/// an inflow on the date of the current last entry sums the two.
///
/// # Example
///
/// ```rust
/// use gilt_core::{CashflowSet, Date};
///
/// let settle = Date::from_ymd(2025, 1, 7).unwrap();
/// let maturity = Date::from_ymd(2025, 6, 7).unwrap();
///
/// let mut flows = CashflowSet::new(settle, 99.5).unwrap();
/// flows.push(maturity, 2.0).unwrap();
/// flows.push(maturity, 100.0).unwrap();
///
/// assert_eq!(flows.len(), 2);
/// assert_eq!(flows.total_inflows(), 102.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowSet {
    cashflows: Vec<Cashflow>,
}

impl CashflowSet {
    /// Opens a stream with the purchase outflow of `price` on `settlement`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCashflow` if `price` is not finite and positive.
    pub fn new(settlement: Date, price: f64) -> CoreResult<Self> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::invalid_cashflow(format!(
                "settlement outflow must be a positive price, got {price}"
            )));
        }

        Ok(Self {
            cashflows: vec![Cashflow::new(settlement, -price)],
        })
    }

    /// Appends an inflow.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCashflow` if the amount is negative or not
    /// finite, or the date precedes the last entry or falls on settlement.
    pub fn push(&mut self, date: Date, amount: f64) -> CoreResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::invalid_cashflow(format!(
                "inflow on {date} must be non-negative, got {amount}"
            )));
        }
        if date <= self.settlement_date() {
            return Err(CoreError::invalid_cashflow(format!(
                "inflow on {date} is not after settlement {}",
                self.settlement_date()
            )));
        }

        match self.cashflows.last_mut() {
            Some(last) if last.date == date => last.amount += amount,
            Some(last) if last.date > date => {
                return Err(CoreError::invalid_cashflow(format!(
                    "inflow on {date} precedes {}",
                    last.date
                )));
            }
            _ => self.cashflows.push(Cashflow::new(date, amount)),
        }

        Ok(())
    }

    /// Returns the settlement date (date of the outflow).
    #[must_use]
    pub fn settlement_date(&self) -> Date {
        self.cashflows[0].date
    }

    /// Returns the settlement outflow as a positive price.
    #[must_use]
    pub fn price(&self) -> f64 {
        -self.cashflows[0].amount
    }

    /// Returns all entries, outflow first.
    #[must_use]
    pub fn as_slice(&self) -> &[Cashflow] {
        &self.cashflows
    }

    /// Returns the inflows after settlement.
    #[must_use]
    pub fn inflows(&self) -> &[Cashflow] {
        &self.cashflows[1..]
    }

    /// Returns the number of entries including the outflow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cashflows.len()
    }

    /// Always false: a set holds at least its outflow.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if no inflows follow the outflow.
    #[must_use]
    pub fn has_no_inflows(&self) -> bool {
        self.cashflows.len() == 1
    }

    /// Sum of all inflows.
    #[must_use]
    pub fn total_inflows(&self) -> f64 {
        self.inflows().iter().map(Cashflow::amount).sum()
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &Cashflow> {
        self.cashflows.iter()
    }
}

impl<'a> IntoIterator for &'a CashflowSet {
    type Item = &'a Cashflow;
    type IntoIter = std::slice::Iter<'a, Cashflow>;

    fn into_iter(self) -> Self::IntoIter {
        self.cashflows.iter()
    }
}
