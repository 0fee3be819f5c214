//! Newton-Raphson safeguarded by bisection.

use crate::error::{MathError, MathResult};
use crate::solvers::{Bracket, SolverConfig, SolverResult};

/// The kind of step taken on one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `x - f(x) / f'(x)`, accepted because it stayed inside the bracket
    /// and at least halved the previous step.
    Newton,
    /// Midpoint of the current bracket.
    Bisection,
}

/// Finds a root of `f` inside `bracket`.
///
/// `f` returns the function value and its derivative at `x`. The ends of
/// the bracket must have opposite signs. Each iteration evaluates `f` once,
/// tightens the bracket around the sign change, then takes a Newton step if
/// it lands strictly inside the new bracket and is no more than half the
/// previous step, otherwise bisects.
///
/// Convergence is declared when `|f(x)| < config.tolerance`, or when the
/// bracket has shrunk to a few ulps so no representable point is closer.
///
/// # Errors
///
/// - `MathError::InvalidInput` if `f` is not finite at either end
/// - `MathError::InvalidBracket` if the ends do not straddle a sign change
/// - `MathError::ConvergenceFailed` if the iteration cap is reached
///
/// # Example
///
/// ```rust
/// use gilt_math::solvers::{newton_bisection, Bracket, SolverConfig};
///
/// let f = |x: f64| (x * x * x - x - 2.0, 3.0 * x * x - 1.0);
/// let result = newton_bisection(f, Bracket::new(1.0, 2.0), &SolverConfig::default()).unwrap();
/// assert!((result.root - 1.5213797068045676).abs() < 1e-9);
/// ```
pub fn newton_bisection<F>(f: F, bracket: Bracket, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> (f64, f64),
{
    let mut lo = bracket.lower;
    let mut hi = bracket.upper;

    let (f_lo, _) = f(lo);
    let (f_hi, _) = f(hi);

    if !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(MathError::invalid_input(format!(
            "function is not finite at bracket ends: f({lo}) = {f_lo}, f({hi}) = {f_hi}"
        )));
    }

    // Handle case where endpoint is the root
    if f_lo.abs() < config.tolerance {
        return Ok(converged(lo, 0, f_lo, 0));
    }
    if f_hi.abs() < config.tolerance {
        return Ok(converged(hi, 0, f_hi, 0));
    }

    if f_lo.signum() == f_hi.signum() {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        });
    }

    let negative_at_lo = f_lo < 0.0;
    let mut x = bracket.start();
    let mut prev_step = hi - lo;
    let mut bisection_steps = 0;
    let mut fx = f64::NAN;

    for iteration in 0..config.max_iterations {
        let (value, slope) = f(x);
        fx = value;

        if fx.abs() < config.tolerance {
            return Ok(converged(x, iteration + 1, fx, bisection_steps));
        }

        // Keep the sign change inside [lo, hi]
        if fx.is_nan() {
            hi = x;
        } else if (fx < 0.0) == negative_at_lo {
            lo = x;
        } else {
            hi = x;
        }

        if hi - lo <= 4.0 * f64::EPSILON * x.abs().max(1.0) {
            return Ok(converged(x, iteration + 1, fx, bisection_steps));
        }

        let newton_x = x - fx / slope;
        let step = if slope != 0.0
            && newton_x.is_finite()
            && newton_x > lo
            && newton_x < hi
            && (newton_x - x).abs() <= 0.5 * prev_step.abs()
        {
            Step::Newton
        } else {
            Step::Bisection
        };

        let next = match step {
            Step::Newton => newton_x,
            Step::Bisection => {
                bisection_steps += 1;
                0.5 * (lo + hi)
            }
        };

        log::trace!("iteration {iteration}: x = {x}, f = {fx:.3e}, {step:?} -> {next}");

        prev_step = next - x;
        x = next;
    }

    Err(MathError::convergence_failed(config.max_iterations, fx.abs()))
}

fn converged(root: f64, iterations: u32, residual: f64, bisection_steps: u32) -> SolverResult {
    SolverResult {
        root,
        iterations,
        residual,
        bisection_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| (x * x - 2.0, 2.0 * x);

        let result = newton_bisection(f, Bracket::new(1.0, 2.0), &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_reversed_bracket() {
        let f = |x: f64| (x * x - 2.0, 2.0 * x);

        let result = newton_bisection(f, Bracket::new(2.0, 1.0), &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_decreasing_function() {
        // Same shape as an NPV profile: falls as the rate rises
        let f = |r: f64| (-100.0 + 104.04 / (1.0 + r), -104.04 / ((1.0 + r) * (1.0 + r)));

        let result = newton_bisection(
            f,
            Bracket::new(-0.99, 10.0).with_guess(0.0),
            &SolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(result.root, 0.0404, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| (x * x - 2.0, 2.0 * x);

        let result = newton_bisection(f, Bracket::new(2.0, 3.0), &SolverConfig::default());

        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_non_finite_end() {
        let f = |x: f64| (1.0 / x, -1.0 / (x * x));

        let result = newton_bisection(f, Bracket::new(0.0, 1.0), &SolverConfig::default());

        assert!(matches!(result, Err(MathError::InvalidInput { .. })));
    }

    #[test]
    fn test_root_at_endpoint() {
        let f = |x: f64| (x - 1.0, 1.0);

        let result = newton_bisection(f, Bracket::new(0.0, 1.0), &SolverConfig::default()).unwrap();

        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_zero_derivative_falls_back_to_bisection() {
        // Derivative reported as zero everywhere: every step must bisect
        let f = |x: f64| (x - 0.3, 0.0);

        let result = newton_bisection(f, Bracket::new(0.0, 1.0), &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, 0.3, epsilon = 1e-9);
        assert_eq!(result.bisection_steps + 1, result.iterations);
    }

    #[test]
    fn test_overshooting_newton_is_contained() {
        // atan has Newton overshoot from far starting points
        let f = |x: f64| (x.atan(), 1.0 / (1.0 + x * x));

        let result = newton_bisection(
            f,
            Bracket::new(-20.0, 30.0).with_guess(10.0),
            &SolverConfig::default(),
        )
        .unwrap();

        assert!(result.root.abs() < 1e-9);
        assert!(result.bisection_steps > 0);
    }

    #[test]
    fn test_iteration_cap() {
        let f = |x: f64| (x - 0.3, 0.0);
        let config = SolverConfig::default().with_max_iterations(3);

        let result = newton_bisection(f, Bracket::new(0.0, 1.0), &config);

        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { iterations: 3, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_finds_square_roots(a in 0.01f64..1.0e4) {
            let f = |x: f64| (x * x - a, 2.0 * x);
            let result = newton_bisection(f, Bracket::new(0.0, a + 1.0), &SolverConfig::default()).unwrap();
            prop_assert!((result.root * result.root - a).abs() < 1e-6 * a.max(1.0));
        }
    }
}
