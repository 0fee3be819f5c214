//! Valuation entry point.
//!
//! Composes schedule, settlement classification, accrual, cashflow
//! projection and yield solving into one [`ValuationResult`]. Every call is
//! a pure function of its inputs: the settlement date is supplied by the
//! caller, never read from the clock here.

use serde::{Deserialize, Serialize};

use gilt_core::{Cashflow, Date};

use crate::cashflows::{classify_settlement, project_cashflows, Accrual, CouponSchedule};
use crate::error::{BondError, BondResult};
use crate::pricing::YieldSolver;
use crate::types::{BondTerms, ExDividendRule};

/// Per-request inputs: when, at what price, at what tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementContext {
    /// Settlement date.
    pub purchase_date: Date,
    /// Clean price per 100 nominal.
    pub clean_price: f64,
    /// Tax rate on coupons as a fraction in `[0, 1)`.
    pub tax_rate: f64,
}

impl SettlementContext {
    /// Creates a settlement context.
    #[must_use]
    pub fn new(purchase_date: Date, clean_price: f64, tax_rate: f64) -> Self {
        Self {
            purchase_date,
            clean_price,
            tax_rate,
        }
    }

    /// Checks the price and tax rate.
    ///
    /// # Errors
    ///
    /// - `BondError::InvalidInput` for a non-finite or non-positive price,
    ///   or a non-finite or negative tax rate
    /// - `BondError::DegenerateTaxRate` for a tax rate of 1 or more
    pub fn validate(&self) -> BondResult<()> {
        if !self.clean_price.is_finite() || self.clean_price <= 0.0 {
            return Err(BondError::invalid_input(format!(
                "price must be finite and positive, got {}",
                self.clean_price
            )));
        }
        validate_tax_rate(self.tax_rate)
    }
}

/// Outcome of one valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    /// ISIN valued.
    pub isin: String,
    /// Display name.
    pub name: String,
    /// Settlement date used.
    pub settlement_date: Date,
    /// Clean price supplied.
    pub clean_price_per_100: f64,
    /// Accrued interest since the previous coupon.
    pub accrued_interest_per_100: f64,
    /// Clean price plus accrued interest.
    pub dirty_price_per_100: f64,
    /// Pre-tax effective annual yield.
    pub annualized_yield: f64,
    /// Post-tax effective annual yield.
    pub post_tax_return: f64,
    /// Post-tax return grossed up by `1 / (1 - tax_rate)`.
    pub gross_equivalent_yield: f64,
    /// Tax rate supplied.
    pub tax_rate: f64,
    /// Next coupon date after settlement.
    pub next_coupon_date: Date,
    /// Previous coupon date, or first issue.
    pub previous_coupon_date: Date,
    /// True if settlement falls in the ex-dividend window.
    pub is_ex_dividend_period: bool,
    /// Pre-tax inflows after settlement.
    pub future_cashflows_per_100: Vec<Cashflow>,
    /// Sum of `future_cashflows_per_100`.
    pub total_future_cashflow_per_100: f64,
}

/// Values gilts with a configurable solver and ex-dividend rule.
///
/// # Example
///
/// ```rust
/// use gilt_bonds::types::BondTerms;
/// use gilt_bonds::valuation::{GiltValuer, SettlementContext};
/// use gilt_core::Date;
///
/// let terms = BondTerms::new(
///     "GB00TEST0001",
///     "4% Treasury Gilt 2030",
///     Date::from_ymd(2020, 6, 7).unwrap(),
///     Date::from_ymd(2030, 6, 7).unwrap(),
///     4.0,
/// )
/// .unwrap();
/// let ctx = SettlementContext::new(Date::from_ymd(2025, 6, 7).unwrap(), 100.0, 0.4);
///
/// let result = GiltValuer::default().value(&terms, &ctx).unwrap();
/// assert_eq!(result.accrued_interest_per_100, 0.0);
/// assert!(result.post_tax_return < result.annualized_yield);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GiltValuer {
    solver: YieldSolver,
    ex_dividend: ExDividendRule,
}

impl GiltValuer {
    /// Creates a valuer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the yield solver.
    #[must_use]
    pub fn with_solver(mut self, solver: YieldSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the ex-dividend rule.
    #[must_use]
    pub fn with_ex_dividend_rule(mut self, rule: ExDividendRule) -> Self {
        self.ex_dividend = rule;
        self
    }

    /// Builds the schedule for `terms` and values at `ctx`.
    ///
    /// # Errors
    ///
    /// See [`GiltValuer::value_with_schedule`].
    pub fn value(&self, terms: &BondTerms, ctx: &SettlementContext) -> BondResult<ValuationResult> {
        ctx.validate()?;
        let schedule = CouponSchedule::build(terms)?;
        self.value_with_schedule(terms, &schedule, ctx)
    }

    /// Values at `ctx` using a pre-built schedule for `terms`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` / `DegenerateTaxRate` for a bad price or tax rate
    /// - `InvalidTerms` if `schedule` was not built from `terms`
    /// - `PriorToIssue` / `Matured` for a settlement outside the bond's life
    /// - `NoConvergence` if either yield cannot be solved
    pub fn value_with_schedule(
        &self,
        terms: &BondTerms,
        schedule: &CouponSchedule,
        ctx: &SettlementContext,
    ) -> BondResult<ValuationResult> {
        ctx.validate()?;
        if schedule.first_issue_date() != terms.first_issue_date
            || schedule.redemption_date() != terms.redemption_date
        {
            return Err(BondError::invalid_terms(format!(
                "{}: schedule does not match terms",
                terms.isin
            )));
        }

        let settlement = classify_settlement(schedule, ctx.purchase_date, &self.ex_dividend)?;
        let accrual = Accrual::compute(terms.coupon_rate_percent, ctx.clean_price, &settlement);
        let projected = project_cashflows(terms, schedule, &settlement, accrual.dirty_price, ctx.tax_rate)?;

        let annualized_yield = self.solver.solve(&projected.pre_tax)?.yield_value;
        let post_tax_return = self.solver.solve(&projected.post_tax)?.yield_value;
        let gross_equivalent = gross_equivalent_yield(post_tax_return, ctx.tax_rate)?;

        let future_cashflows = projected.pre_tax.inflows().to_vec();
        let total_future = future_cashflows.iter().map(Cashflow::amount).sum();

        Ok(ValuationResult {
            isin: terms.isin.clone(),
            name: terms.name.clone(),
            settlement_date: settlement.settlement_date,
            clean_price_per_100: ctx.clean_price,
            accrued_interest_per_100: accrual.accrued_interest,
            dirty_price_per_100: accrual.dirty_price,
            annualized_yield,
            post_tax_return,
            gross_equivalent_yield: gross_equivalent,
            tax_rate: ctx.tax_rate,
            next_coupon_date: settlement.next_coupon_date,
            previous_coupon_date: settlement.previous_coupon_date,
            is_ex_dividend_period: accrual.is_ex_dividend_period,
            future_cashflows_per_100: future_cashflows,
            total_future_cashflow_per_100: total_future,
        })
    }
}

/// Values `terms` at `ctx` with default settings.
///
/// # Errors
///
/// See [`GiltValuer::value_with_schedule`].
pub fn value(terms: &BondTerms, ctx: &SettlementContext) -> BondResult<ValuationResult> {
    GiltValuer::default().value(terms, ctx)
}

/// Values `terms` at `ctx` with a pre-built schedule and default settings.
///
/// # Errors
///
/// See [`GiltValuer::value_with_schedule`].
pub fn value_with_schedule(
    terms: &BondTerms,
    schedule: &CouponSchedule,
    ctx: &SettlementContext,
) -> BondResult<ValuationResult> {
    GiltValuer::default().value_with_schedule(terms, schedule, ctx)
}

/// Pre-tax yield a fully taxed instrument needs to match `post_tax_return`.
///
/// # Errors
///
/// - `BondError::InvalidInput` for a non-finite return or a non-finite or
///   negative tax rate
/// - `BondError::DegenerateTaxRate` for a tax rate of 1 or more
pub fn gross_equivalent_yield(post_tax_return: f64, tax_rate: f64) -> BondResult<f64> {
    if !post_tax_return.is_finite() {
        return Err(BondError::invalid_input(format!(
            "post-tax return must be finite, got {post_tax_return}"
        )));
    }
    validate_tax_rate(tax_rate)?;
    Ok(post_tax_return / (1.0 - tax_rate))
}

fn validate_tax_rate(tax_rate: f64) -> BondResult<()> {
    if !tax_rate.is_finite() || tax_rate < 0.0 {
        return Err(BondError::invalid_input(format!(
            "tax rate must be finite and non-negative, got {tax_rate}"
        )));
    }
    if tax_rate >= 1.0 {
        return Err(BondError::DegenerateTaxRate { tax_rate });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn four_percent() -> BondTerms {
        BondTerms::new("GB00TEST0001", "4% Treasury Gilt 2030", d(2020, 6, 8), d(2030, 6, 8), 4.0).unwrap()
    }

    #[test]
    fn test_at_par_on_coupon_date() {
        let result = value(&four_percent(), &SettlementContext::new(d(2025, 6, 8), 100.0, 0.0)).unwrap();

        assert_eq!(result.accrued_interest_per_100, 0.0);
        assert_eq!(result.dirty_price_per_100, 100.0);
        assert_eq!(result.previous_coupon_date, d(2025, 6, 8));
        assert_eq!(result.next_coupon_date, d(2025, 12, 8));
        assert!(!result.is_ex_dividend_period);
        assert_relative_eq!(result.annualized_yield, 0.0404, epsilon = 5e-4);
        assert_eq!(result.post_tax_return, result.annualized_yield);
        assert_eq!(result.gross_equivalent_yield, result.annualized_yield);
    }

    #[test]
    fn test_taxed_valuation() {
        let result = value(&four_percent(), &SettlementContext::new(d(2025, 6, 8), 100.0, 0.4)).unwrap();

        assert!(result.post_tax_return < result.annualized_yield);
        assert_relative_eq!(result.gross_equivalent_yield, result.post_tax_return / 0.6, epsilon = 1e-15);
        assert_relative_eq!(result.post_tax_return, 0.024, epsilon = 5e-4);
    }

    #[test]
    fn test_result_detail() {
        let result = value(&four_percent(), &SettlementContext::new(d(2029, 9, 1), 99.0, 0.2)).unwrap();

        assert_eq!(result.isin, "GB00TEST0001");
        assert_eq!(result.settlement_date, d(2029, 9, 1));
        assert_eq!(result.clean_price_per_100, 99.0);
        assert_eq!(result.tax_rate, 0.2);
        assert_eq!(result.future_cashflows_per_100.len(), 2);
        assert_relative_eq!(result.total_future_cashflow_per_100, 104.0);
        assert_relative_eq!(result.dirty_price_per_100, 99.0 + 2.0 * 85.0 / 182.5, epsilon = 1e-12);
    }

    #[test]
    fn test_input_validation() {
        let terms = four_percent();
        let at = |price: f64, tax: f64| value(&terms, &SettlementContext::new(d(2025, 6, 8), price, tax));

        assert!(matches!(at(0.0, 0.2), Err(BondError::InvalidInput { .. })));
        assert!(matches!(at(-5.0, 0.2), Err(BondError::InvalidInput { .. })));
        assert!(matches!(at(f64::NAN, 0.2), Err(BondError::InvalidInput { .. })));
        assert!(matches!(at(100.0, -0.1), Err(BondError::InvalidInput { .. })));
        assert!(matches!(at(100.0, f64::INFINITY), Err(BondError::InvalidInput { .. })));
        assert!(matches!(at(100.0, 1.0), Err(BondError::DegenerateTaxRate { .. })));
    }

    #[test]
    fn test_outside_life() {
        let terms = four_percent();
        assert!(matches!(
            value(&terms, &SettlementContext::new(d(2020, 6, 7), 100.0, 0.0)),
            Err(BondError::PriorToIssue { .. })
        ));
        assert!(matches!(
            value(&terms, &SettlementContext::new(d(2030, 6, 8), 100.0, 0.0)),
            Err(BondError::Matured { .. })
        ));
    }

    #[test]
    fn test_mismatched_schedule() {
        let other = BondTerms::new("GB00TEST0002", "x", d(2021, 1, 1), d(2031, 1, 1), 1.0).unwrap();
        let schedule = CouponSchedule::build(&other).unwrap();

        let result = value_with_schedule(
            &four_percent(),
            &schedule,
            &SettlementContext::new(d(2025, 6, 8), 100.0, 0.0),
        );

        assert!(matches!(result, Err(BondError::InvalidTerms { .. })));
    }

    #[test]
    fn test_gross_equivalent_yield() {
        assert_relative_eq!(gross_equivalent_yield(0.03, 0.4).unwrap(), 0.05, epsilon = 1e-15);
        assert_eq!(gross_equivalent_yield(0.03, 0.0).unwrap(), 0.03);
        assert!(matches!(
            gross_equivalent_yield(0.03, 1.0),
            Err(BondError::DegenerateTaxRate { .. })
        ));
        assert!(matches!(
            gross_equivalent_yield(0.03, -0.01),
            Err(BondError::InvalidInput { .. })
        ));
        assert!(matches!(
            gross_equivalent_yield(f64::NAN, 0.2),
            Err(BondError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_valuer_uses_configured_solver() {
        let ctx = SettlementContext::new(d(2025, 9, 1), 97.25, 0.2);
        assert!(GiltValuer::new().value(&four_percent(), &ctx).is_ok());

        let starved = GiltValuer::new().with_solver(YieldSolver::new().with_max_iterations(0));
        let result = starved.value(&four_percent(), &ctx);

        assert!(matches!(result, Err(BondError::NoConvergence { .. })), "{result:?}");
    }

    #[test]
    fn test_valuer_uses_configured_ex_dividend_rule() {
        // Eight weekdays before the 2025-12-08 coupon
        let ctx = SettlementContext::new(d(2025, 11, 26), 99.0, 0.0);

        let standard = GiltValuer::new().value(&four_percent(), &ctx).unwrap();
        assert!(!standard.is_ex_dividend_period);
        assert_eq!(standard.future_cashflows_per_100[0].date(), d(2025, 12, 8));

        let wide = GiltValuer::new()
            .with_ex_dividend_rule(ExDividendRule::custom(10))
            .value(&four_percent(), &ctx)
            .unwrap();
        assert!(wide.is_ex_dividend_period);
        assert_eq!(wide.next_coupon_date, d(2025, 12, 8));
        assert_eq!(wide.future_cashflows_per_100[0].date(), d(2026, 6, 8));
        assert!(wide.total_future_cashflow_per_100 < standard.total_future_cashflow_per_100);
    }

    #[test]
    fn test_serialises_dates_as_iso() {
        let result = value(&four_percent(), &SettlementContext::new(d(2025, 6, 8), 100.0, 0.0)).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["next_coupon_date"], "2025-12-08");
        assert_eq!(json["is_ex_dividend_period"], false);
        assert_eq!(json["future_cashflows_per_100"][0]["date"], "2025-12-08");
    }
}
