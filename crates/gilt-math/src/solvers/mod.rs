//! Root-finding algorithms.
//!
//! - [`newton_bisection`]: Newton-Raphson steps kept inside a sign-change
//!   bracket, falling back to bisection whenever a Newton step would leave
//!   the bracket or shrink it too slowly
//!
//! The bracket guarantees convergence for any continuous function with a
//! sign change; Newton gives quadratic convergence near the root when an
//! analytic derivative is available.
//!
//! # Example: IRR of a two-period stream
//!
//! ```rust
//! use gilt_math::solvers::{newton_bisection, Bracket, SolverConfig};
//!
//! // Pay 95 today, receive 5 in one year and 105 in two.
//! let npv = |r: f64| {
//!     let d = 1.0 + r;
//!     let value = -95.0 + 5.0 / d + 105.0 / (d * d);
//!     let slope = -5.0 / (d * d) - 210.0 / (d * d * d);
//!     (value, slope)
//! };
//!
//! let result = newton_bisection(npv, Bracket::new(-0.99, 10.0), &SolverConfig::default()).unwrap();
//! assert!(result.root > 0.05);
//! ```

mod hybrid;

pub use hybrid::{newton_bisection, Step};

/// Default tolerance on the absolute function value.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence threshold on `|f(x)|`.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
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
}

/// A search interval, optionally with a starting point inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Lower end.
    pub lower: f64,
    /// Upper end.
    pub upper: f64,
    /// Starting point; the midpoint is used when absent or outside the interval.
    pub guess: Option<f64>,
}

impl Bracket {
    /// Creates a bracket; the ends may be given in either order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
            guess: None,
        }
    }

    /// Sets the starting point.
    #[must_use]
    pub fn with_guess(mut self, guess: f64) -> Self {
        self.guess = Some(guess);
        self
    }

    /// Returns the width of the interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns the starting point clamped to the open interval.
    #[must_use]
    pub fn start(&self) -> f64 {
        match self.guess {
            Some(g) if g.is_finite() && g > self.lower && g < self.upper => g,
            _ => 0.5 * (self.lower + self.upper),
        }
    }
}

/// Result of a root-finding operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of function evaluations inside the main loop.
    pub iterations: u32,
    /// Function value at the root.
    pub residual: f64,
    /// How many of the steps were bisections.
    pub bisection_steps: u32,
}
