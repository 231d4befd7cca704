//! Implied volatility extraction from option prices.
//!
//! - [`ImpliedVolSolver`]: Black-Scholes inversion by Brent's method on a
//!   bounded volatility interval, returning an [`IvResult`] with a
//!   [`SolverStatus`] instead of failing on ordinary non-convergence
//! - [`no_arbitrage_bounds`]: static price bounds checked before solving

pub mod bounds;
pub mod solver;

pub use bounds::{PriceBounds, no_arbitrage_bounds};
pub use solver::{ImpliedVolSolver, IvResult, SolverStatus};
