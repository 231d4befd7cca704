//! Data-quality accounting for a surface build.
//!
//! Every input quote ends up in exactly one bucket: excluded by a filter,
//! rejected by the solver, rejected by the sanity ceiling, merged into a
//! shared cell, or placed on the grid. The presentation layer uses these
//! counts to explain why a surface is sparse.

use serde::{Deserialize, Serialize};

use crate::implied::{IvResult, SolverStatus};
use crate::types::OptionQuote;

/// A quote whose solve hit the iteration cap, kept for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonConvergentQuote {
    /// The quote that was being solved.
    pub quote: OptionQuote,
    /// Best volatility estimate when the cap was hit.
    pub best_estimate: Option<f64>,
    /// Pricing evaluations made before the cap was hit.
    pub iterations: usize,
}

/// Per-reason counts for one surface build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    /// Quotes handed to the builder.
    pub input_quotes: usize,
    /// Non-finite or non-positive spot/strike, negative expiry or price.
    pub excluded_malformed: usize,
    /// Volume below the configured minimum.
    pub excluded_by_volume: usize,
    /// Strike outside the configured moneyness band.
    pub excluded_by_strike: usize,
    /// Expiry shorter than the configured minimum.
    pub excluded_by_expiry: usize,
    /// Price below the configured minimum.
    pub excluded_by_price: usize,
    /// Quotes handed to the solver.
    pub solved: usize,
    /// Solves that converged.
    pub converged: usize,
    /// Solves rejected by the no-arbitrage check.
    pub no_arbitrage: usize,
    /// Solves whose price no volatility in the search interval reproduces.
    pub out_of_bounds: usize,
    /// Solves that exhausted the iteration cap.
    pub non_convergent: Vec<NonConvergentQuote>,
    /// Converged volatilities dropped for exceeding the sanity ceiling.
    pub above_ceiling: usize,
    /// Converged quotes folded into a cell another quote already occupies.
    pub merged_duplicates: usize,
    /// Cells on the resulting grid.
    pub surface_points: usize,
}

impl BuildDiagnostics {
    /// Quotes removed before solving.
    pub fn excluded_total(&self) -> usize {
        self.excluded_malformed
            + self.excluded_by_volume
            + self.excluded_by_strike
            + self.excluded_by_expiry
            + self.excluded_by_price
    }

    /// Quotes the solver could not turn into a converged volatility.
    pub fn failed_to_solve(&self) -> usize {
        self.no_arbitrage + self.out_of_bounds + self.non_convergent.len()
    }

    /// Tally one solver outcome.
    pub(crate) fn record(&mut self, result: &IvResult<'_>) {
        match result.status {
            SolverStatus::Converged => self.converged += 1,
            SolverStatus::NoArbitrageViolation => self.no_arbitrage += 1,
            SolverStatus::OutOfBounds => self.out_of_bounds += 1,
            SolverStatus::NonConvergent => self.non_convergent.push(NonConvergentQuote {
                quote: *result.quote,
                best_estimate: result.vol.map(|v| v.0),
                iterations: result.iterations,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionType, Vol};

    #[test]
    fn record_routes_each_status() {
        let quote = OptionQuote::new(100.0, 0.5, OptionType::Call, 5.0, 10, 100.0);
        let mut diag = BuildDiagnostics::default();
        for status in [
            SolverStatus::Converged,
            SolverStatus::NoArbitrageViolation,
            SolverStatus::OutOfBounds,
            SolverStatus::NonConvergent,
        ] {
            diag.record(&IvResult {
                quote: &quote,
                vol: Some(Vol(0.2)),
                status,
                iterations: 7,
            });
        }
        assert_eq!(diag.converged, 1);
        assert_eq!(diag.no_arbitrage, 1);
        assert_eq!(diag.out_of_bounds, 1);
        assert_eq!(diag.non_convergent.len(), 1);
        assert_eq!(diag.non_convergent[0].iterations, 7);
        assert_eq!(diag.non_convergent[0].best_estimate, Some(0.2));
        assert_eq!(diag.failed_to_solve(), 3);
    }

    #[test]
    fn excluded_total_sums_filters() {
        let diag = BuildDiagnostics {
            excluded_malformed: 1,
            excluded_by_volume: 2,
            excluded_by_strike: 3,
            excluded_by_expiry: 4,
            excluded_by_price: 5,
            ..Default::default()
        };
        assert_eq!(diag.excluded_total(), 15);
    }
}
