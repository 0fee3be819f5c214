//! Yield solving.

mod yield_solver;

pub use yield_solver::{xnpv, YieldResult, YieldSolver, DAYS_PER_YEAR};
