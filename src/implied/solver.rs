//! Black-Scholes implied volatility by bracketed root finding.
//!
//! Given an observed price, find σ with `BS(σ) − price = 0` on a bounded
//! search interval. The solver distinguishes four outcomes and only returns
//! `Err` for malformed inputs:
//!
//! | Status | Meaning | `vol` |
//! |---|---|---|
//! | [`Converged`](SolverStatus::Converged) | bracket shrank below tolerance | solved σ |
//! | [`NoArbitrageViolation`](SolverStatus::NoArbitrageViolation) | price outside `[intrinsic, upper bound]` | `None` |
//! | [`OutOfBounds`](SolverStatus::OutOfBounds) | no sign change across the search interval | `None` |
//! | [`NonConvergent`](SolverStatus::NonConvergent) | iteration cap hit | best estimate |

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::implied::bounds::no_arbitrage_bounds;
use crate::optim::{BrentConfig, brent};
use crate::pricing::black_scholes::price_unchecked;
use crate::types::{ModelInputs, OptionQuote, Vol};
use crate::validate::{validate_finite, validate_quote};

/// Outcome class of one implied volatility solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// Root found within tolerance.
    Converged,
    /// Observed price violates static no-arbitrage bounds; no solve attempted.
    NoArbitrageViolation,
    /// No volatility in the search interval reproduces the price.
    OutOfBounds,
    /// Iteration cap exhausted before the bracket converged.
    NonConvergent,
}

impl SolverStatus {
    /// Stable snake_case label, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Converged => "converged",
            SolverStatus::NoArbitrageViolation => "no_arbitrage_violation",
            SolverStatus::OutOfBounds => "out_of_bounds",
            SolverStatus::NonConvergent => "non_convergent",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of solving one quote. Borrows the quote it was solved from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvResult<'a> {
    /// The originating quote.
    pub quote: &'a OptionQuote,
    /// Solved volatility, the best estimate when non-convergent, `None` otherwise.
    pub vol: Option<Vol>,
    /// Outcome class.
    pub status: SolverStatus,
    /// Pricing evaluations the root finder made inside the bracket, not
    /// counting its two endpoints (0 when no solve was attempted).
    pub iterations: usize,
}

impl IvResult<'_> {
    /// Whether the solve converged.
    pub fn is_converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }

    /// The volatility, only if the solve converged.
    pub fn converged_vol(&self) -> Option<Vol> {
        if self.is_converged() { self.vol } else { None }
    }
}

/// Implied volatility solver over a fixed search interval.
///
/// Stateless apart from its configuration; share it freely across threads.
///
/// # Examples
/// ```
/// use ivsurf::implied::{ImpliedVolSolver, SolverStatus};
/// use ivsurf::types::{OptionQuote, OptionType};
///
/// let solver = ImpliedVolSolver::default();
/// let quote = OptionQuote::new(100.0, 0.5, OptionType::Call, 6.888_728_577_680_624, 100, 100.0);
/// let result = solver.solve(&quote, 0.05, 0.0)?;
/// assert_eq!(result.status, SolverStatus::Converged);
/// assert!((result.vol.unwrap().0 - 0.20).abs() < 1e-6);
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolSolver {
    config: SolverConfig,
}

impl ImpliedVolSolver {
    /// Create a solver.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput)
    /// if the configuration does not validate.
    pub fn new(config: SolverConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The solver's configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the implied volatility of `quote`.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput)
    /// for non-positive spot or strike, negative expiry or price, or
    /// non-finite rate/yield. Every other outcome is an [`IvResult`].
    pub fn solve<'a>(
        &self,
        quote: &'a OptionQuote,
        rate: f64,
        dividend_yield: f64,
    ) -> crate::error::Result<IvResult<'a>> {
        validate_quote(quote)?;
        validate_finite(rate, "rate")?;
        validate_finite(dividend_yield, "dividend_yield")?;

        let unsolved = |status| IvResult {
            quote,
            vol: None,
            status,
            iterations: 0,
        };

        if !no_arbitrage_bounds(quote, rate).contains(quote.price) {
            return Ok(unsolved(SolverStatus::NoArbitrageViolation));
        }

        let inputs = ModelInputs::from_quote(quote, rate, dividend_yield, 0.0);
        let residual =
            |vol: f64| price_unchecked(&inputs.with_vol(vol), quote.option_type) - quote.price;

        let (lo, hi) = (self.config.vol_lower, self.config.vol_upper);
        let (f_lo, f_hi) = (residual(lo), residual(hi));
        // Strict sign change: a zero residual at an endpoint means the price
        // cannot be told apart from the boundary of the interval.
        if !(f_lo < 0.0 && f_hi > 0.0) && !(f_lo > 0.0 && f_hi < 0.0) {
            return Ok(unsolved(SolverStatus::OutOfBounds));
        }

        let found = brent(
            residual,
            lo,
            hi,
            f_lo,
            f_hi,
            &BrentConfig {
                max_iter: self.config.max_iterations,
                tol: self.config.tolerance,
            },
        );

        let status = if found.converged {
            SolverStatus::Converged
        } else {
            #[cfg(feature = "logging")]
            tracing::debug!(
                strike = quote.strike,
                expiry = quote.expiry,
                iterations = found.iterations,
                best_estimate = found.root,
                "implied vol solve exhausted its iteration cap"
            );
            SolverStatus::NonConvergent
        };

        Ok(IvResult {
            quote,
            vol: Some(Vol(found.root)),
            status,
            iterations: found.iterations,
        })
    }

    /// Solve and keep only a converged volatility.
    ///
    /// # Errors
    /// Same as [`solve`](Self::solve).
    pub fn implied_vol(
        &self,
        quote: &OptionQuote,
        rate: f64,
        dividend_yield: f64,
    ) -> crate::error::Result<Option<Vol>> {
        Ok(self.solve(quote, rate, dividend_yield)?.converged_vol())
    }
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }
}
