//! # Gilt Math
//!
//! Numerical root-finding for the gilt yield engine.
//!
//! - **Solvers**: Newton-Raphson safeguarded by bisection inside a sign-change
//!   bracket, with a fixed iteration cap
//!
//! ## Example
//!
//! ```rust
//! use gilt_math::solvers::{newton_bisection, Bracket, SolverConfig};
//!
//! let f = |x: f64| (x * x - 2.0, 2.0 * x);
//! let result = newton_bisection(f, Bracket::new(0.0, 2.0), &SolverConfig::default()).unwrap();
//! assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod solvers;

pub use error::{MathError, MathResult};
