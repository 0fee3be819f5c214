//! Effective annual yield (XIRR) of a dated cashflow stream.
//!
//! Finds `r` such that
//!
//! ```text
//! Σ amount_i / (1 + r) ^ (days_i / 365) = 0
//! ```
//!
//! where `days_i` counts calendar days from settlement. With a single
//! leading outflow and positive inflows the sum falls monotonically in `r`,
//! so a bracketed Newton/bisection search always converges when a sign
//! change exists.
//!
//! # Example
//!
//! ```rust
//! use gilt_bonds::pricing::YieldSolver;
//! use gilt_core::{CashflowSet, Date};
//!
//! let mut flows = CashflowSet::new(Date::from_ymd(2025, 1, 1).unwrap(), 100.0).unwrap();
//! flows.push(Date::from_ymd(2026, 1, 1).unwrap(), 105.0).unwrap();
//!
//! let result = YieldSolver::new().solve(&flows).unwrap();
//! assert!((result.yield_value - 0.05).abs() < 1e-9);
//! ```

use gilt_core::CashflowSet;
use gilt_math::solvers::{newton_bisection, Bracket, SolverConfig};
use gilt_math::MathError;

use crate::error::{BondError, BondResult};

/// Day count basis of the discount exponent.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Result of a yield calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldResult {
    /// The calculated yield (as a decimal, e.g., 0.05 for 5%).
    pub yield_value: f64,
    /// Number of iterations to converge.
    pub iterations: u32,
    /// Final residual (should be near zero).
    pub residual: f64,
}

/// Yield solver.
///
/// Defaults: tolerance `1e-9` per unit of price, 100 iterations, search
/// bracket `[-0.99, 10.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldSolver {
    tolerance: f64,
    max_iterations: u32,
    lower: f64,
    upper: f64,
}

impl Default for YieldSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl YieldSolver {
    /// Creates a new yield solver with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 100,
            lower: -0.99,
            upper: 10.0,
        }
    }

    /// Sets the NPV tolerance per unit of price.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the search bracket.
    #[must_use]
    pub fn with_bracket(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower.min(upper);
        self.upper = lower.max(upper);
        self
    }

    /// Solves for the effective annual yield of `flows`.
    ///
    /// # Errors
    ///
    /// Returns `BondError::NoConvergence` if there are no inflows, the
    /// bracket holds no sign change, or the iteration cap is reached.
    pub fn solve(&self, flows: &CashflowSet) -> BondResult<YieldResult> {
        if flows.has_no_inflows() {
            return Err(BondError::no_convergence("no cashflows after settlement"));
        }

        let terms = discount_terms(flows);
        let price = flows.price();
        let config = SolverConfig::new(self.tolerance * price, self.max_iterations);
        let bracket = Bracket::new(self.lower, self.upper).with_guess(initial_guess(flows, &terms));

        let result = newton_bisection(|r| npv_and_slope(r, &terms), bracket, &config).map_err(|e| {
            match e {
                MathError::InvalidBracket { a, b, fa, fb } => BondError::no_convergence(format!(
                    "no sign change in [{a}, {b}]: npv {fa:.6e} / {fb:.6e}"
                )),
                other => BondError::no_convergence(other.to_string()),
            }
        })?;

        if result.bisection_steps > 0 {
            log::debug!(
                "yield solved with {} of {} steps bisected: r = {:.10}",
                result.bisection_steps,
                result.iterations,
                result.root
            );
        }

        Ok(YieldResult {
            yield_value: result.root,
            iterations: result.iterations,
            residual: result.residual,
        })
    }
}

/// Net present value of `flows` at `rate`, discounting to settlement.
///
/// Returns infinity for `rate <= -1`.
#[must_use]
pub fn xnpv(rate: f64, flows: &CashflowSet) -> f64 {
    if rate <= -1.0 {
        return f64::INFINITY;
    }
    npv_and_slope(rate, &discount_terms(flows)).0
}

/// (years from settlement, amount) for every entry.
fn discount_terms(flows: &CashflowSet) -> Vec<(f64, f64)> {
    let settlement = flows.settlement_date();
    flows
        .iter()
        .map(|cf| (settlement.days_between(&cf.date()) as f64 / DAYS_PER_YEAR, cf.amount()))
        .collect()
}

fn npv_and_slope(rate: f64, terms: &[(f64, f64)]) -> (f64, f64) {
    let base = 1.0 + rate;
    terms.iter().fold((0.0, 0.0), |(npv, slope), &(years, amount)| {
        let df = base.powf(-years);
        (npv + amount * df, slope - years * amount * df / base)
    })
}

/// Exact for a single inflow; a close start otherwise.
fn initial_guess(flows: &CashflowSet, terms: &[(f64, f64)]) -> f64 {
    let horizon = terms.last().map_or(0.0, |&(years, _)| years);
    let ratio = flows.total_inflows() / flows.price();
    if horizon > 0.0 && ratio > 0.0 {
        ratio.powf(1.0 / horizon) - 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gilt_core::Date;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_single_inflow() {
        let mut flows = CashflowSet::new(d(2025, 1, 1), 100.0).unwrap();
        flows.push(d(2026, 1, 1), 105.0).unwrap();

        let result = YieldSolver::new().solve(&flows).unwrap();

        assert_relative_eq!(result.yield_value, 0.05, epsilon = 1e-10);
    }

    #[test]
    fn test_one_day_holding() {
        let mut flows = CashflowSet::new(d(2025, 6, 6), 99.99).unwrap();
        flows.push(d(2025, 6, 7), 100.0).unwrap();

        let result = YieldSolver::new().solve(&flows).unwrap();
        let expected = (100.0f64 / 99.99).powf(365.0) - 1.0;

        assert_relative_eq!(result.yield_value, expected, epsilon = 1e-6);
        assert!(xnpv(result.yield_value, &flows).abs() < 1e-9 * 99.99);
    }

    #[test]
    fn test_coupon_stream_round_trip() {
        let mut flows = CashflowSet::new(d(2025, 6, 7), 100.0).unwrap();
        flows.push(d(2025, 12, 7), 2.0).unwrap();
        flows.push(d(2026, 6, 7), 2.0).unwrap();
        flows.push(d(2026, 12, 7), 102.0).unwrap();

        let result = YieldSolver::new().solve(&flows).unwrap();

        assert!(xnpv(result.yield_value, &flows).abs() < 1e-9 * 100.0);
        assert_relative_eq!(result.yield_value, 0.0404, epsilon = 5e-4);
    }

    #[test]
    fn test_negative_yield() {
        let mut flows = CashflowSet::new(d(2025, 1, 1), 110.0).unwrap();
        flows.push(d(2026, 1, 1), 100.0).unwrap();

        let result = YieldSolver::new().solve(&flows).unwrap();

        assert_relative_eq!(result.yield_value, 100.0 / 110.0 - 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_no_inflows() {
        let flows = CashflowSet::new(d(2025, 1, 1), 100.0).unwrap();
        assert!(matches!(
            YieldSolver::new().solve(&flows),
            Err(BondError::NoConvergence { .. })
        ));
    }

    #[test]
    fn test_root_outside_bracket() {
        // A 2% loss overnight annualises below -99%
        let mut flows = CashflowSet::new(d(2025, 6, 6), 102.0).unwrap();
        flows.push(d(2025, 6, 7), 100.0).unwrap();

        assert!(matches!(
            YieldSolver::new().solve(&flows),
            Err(BondError::NoConvergence { .. })
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let mut flows = CashflowSet::new(d(2025, 6, 7), 100.0).unwrap();
        flows.push(d(2025, 12, 7), 2.0).unwrap();
        flows.push(d(2026, 12, 7), 102.0).unwrap();

        let solver = YieldSolver::new().with_max_iterations(0);
        assert!(matches!(solver.solve(&flows), Err(BondError::NoConvergence { .. })));
    }

    #[test]
    fn test_xnpv_below_minus_one() {
        let mut flows = CashflowSet::new(d(2025, 1, 1), 100.0).unwrap();
        flows.push(d(2026, 1, 1), 105.0).unwrap();
        assert!(xnpv(-1.0, &flows).is_infinite());
        assert_relative_eq!(xnpv(0.0, &flows), 5.0);
    }

    #[test]
    fn test_builder() {
        let solver = YieldSolver::new()
            .with_tolerance(1e-6)
            .with_max_iterations(50)
            .with_bracket(1.0, -0.5);
        assert_eq!(solver.lower, -0.5);
        assert_eq!(solver.upper, 1.0);
        assert_eq!(solver.max_iterations, 50);
    }
}
