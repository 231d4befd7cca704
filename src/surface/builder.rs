//! Surface construction from a raw option chain.
//!
//! ```
//! use ivsurf::surface::SurfaceBuilder;
//! use ivsurf::types::{ModelInputs, OptionQuote, OptionType};
//! use ivsurf::pricing::price;
//!
//! let spot = 100.0;
//! let mut quotes = Vec::new();
//! for expiry in [0.25, 0.5] {
//!     for strike in [85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0] {
//!         let inputs = ModelInputs {
//!             spot, strike, expiry, rate: 0.02, dividend_yield: 0.0, vol: 0.25,
//!         };
//!         let p = price(&inputs, OptionType::Call)?;
//!         quotes.push(OptionQuote::new(strike, expiry, OptionType::Call, p, 100, spot));
//!     }
//! }
//!
//! let build = SurfaceBuilder::new()
//!     .rate(0.02)
//!     .dividend_yield(0.0)
//!     .add_quotes(&quotes)
//!     .build()?;
//!
//! assert_eq!(build.grid.len(), 14);
//! assert_eq!(build.diagnostics.converged, 14);
//! # Ok::<(), ivsurf::IvSurfError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::chain::OptionChain;
use crate::config::{SolverConfig, SurfaceConfig};
use crate::error::IvSurfError;
use crate::implied::{ImpliedVolSolver, IvResult};
use crate::surface::diagnostics::BuildDiagnostics;
use crate::surface::grid::{SurfaceGrid, SurfacePoint};
use crate::types::{OptionQuote, OptionType};
use crate::validate::{validate_positive, validate_quote};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A finished build: the grid plus the accounting of every input quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBuild {
    /// The implied volatility grid.
    pub grid: SurfaceGrid,
    /// Per-reason quote counts.
    pub diagnostics: BuildDiagnostics,
}

/// Builder for an implied volatility surface.
///
/// Accumulates quotes and parameters, then filters, solves and assembles a
/// [`SurfaceGrid`]. Every parameter defaults to [`SurfaceConfig::default`].
/// The spot defaults to the snapshot spot of the chain or, for loose quotes,
/// to the spot carried by the first well-formed quote.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuilder {
    spot: Option<f64>,
    config: SurfaceConfig,
    quotes: Vec<OptionQuote>,
}

impl SurfaceBuilder {
    /// Create a builder with default configuration and no quotes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the spot used for the out-of-the-money tie-break and stored on the grid.
    ///
    /// The strike band filter and the solver still use the spot carried by
    /// each quote, so an override that differs from the quotes' spot moves
    /// the tie-break without moving the band.
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Set the risk-free rate (decimal).
    pub fn rate(mut self, rate: f64) -> Self {
        self.config.rate = rate;
        self
    }

    /// Set the continuous dividend yield (decimal).
    pub fn dividend_yield(mut self, q: f64) -> Self {
        self.config.dividend_yield = q;
        self
    }

    /// Set the minimum traded volume.
    pub fn min_volume(mut self, min_volume: u64) -> Self {
        self.config.min_volume = min_volume;
        self
    }

    /// Set the accepted strike band as multiples of spot.
    pub fn strike_bounds(mut self, min_moneyness: f64, max_moneyness: f64) -> Self {
        self.config.min_moneyness = min_moneyness;
        self.config.max_moneyness = max_moneyness;
        self
    }

    /// Set the solver configuration.
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.config.solver = solver;
        self
    }

    /// Add one quote.
    pub fn add_quote(mut self, quote: OptionQuote) -> Self {
        self.quotes.push(quote);
        self
    }

    /// Add quotes.
    pub fn add_quotes(mut self, quotes: &[OptionQuote]) -> Self {
        self.quotes.extend_from_slice(quotes);
        self
    }

    /// Add every quote of a chain snapshot and take its spot.
    pub fn chain(mut self, chain: &OptionChain) -> Self {
        self.spot = Some(chain.spot);
        self.quotes.extend(chain.to_quotes());
        self
    }

    /// Filter, solve and assemble the surface.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for an invalid configuration or
    /// when no spot is available, and [`IvSurfError::InsufficientData`] when
    /// fewer than `min_points` cells survive.
    pub fn build(self) -> crate::error::Result<SurfaceBuild> {
        let spot = self
            .spot
            .or_else(|| {
                self.quotes
                    .iter()
                    .map(|q| q.spot)
                    .find(|s| s.is_finite() && *s > 0.0)
            })
            .ok_or_else(|| IvSurfError::InvalidInput {
                message: "spot price is required: set it or add quotes carrying one".into(),
            })?;
        build_surface(&self.quotes, spot, &self.config)
    }
}

/// Why a quote was removed before solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exclusion {
    Malformed,
    Volume,
    Strike,
    Expiry,
    Price,
}

fn screen(quote: &OptionQuote, config: &SurfaceConfig) -> Option<Exclusion> {
    if validate_quote(quote).is_err() {
        return Some(Exclusion::Malformed);
    }
    if quote.volume < config.min_volume {
        return Some(Exclusion::Volume);
    }
    let m = quote.moneyness();
    if m < config.min_moneyness || m > config.max_moneyness {
        return Some(Exclusion::Strike);
    }
    if quote.expiry < config.min_expiry {
        return Some(Exclusion::Expiry);
    }
    if quote.price < config.min_price {
        return Some(Exclusion::Price);
    }
    None
}

/// A converged volatility waiting for its cell.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    strike: f64,
    expiry: f64,
    vol: f64,
    option_type: OptionType,
}

/// Build a surface from quotes with explicit parameters.
///
/// Pipeline:
/// 1. screen quotes (malformed, volume, strike band, expiry, price);
/// 2. sort survivors by (expiry, strike) and solve each independently;
/// 3. keep converged volatilities that are finite, non-negative and within
///    the sanity ceiling;
/// 4. resolve shared cells (see below) and assemble the grid.
///
/// # Cell tie-break
/// When several quotes land on the same (strike, expiry) cell, typically a
/// call and a put, the out-of-the-money side wins: the put below spot, the
/// call above. Candidates still tied (both sides at `strike == spot`, or
/// repeated quotes of the winning side) are averaged. The result does not
/// depend on input order.
///
/// # Errors
/// Returns [`IvSurfError::InvalidInput`] for an invalid configuration or
/// spot, and [`IvSurfError::InsufficientData`] when fewer than
/// `config.min_points` cells survive.
pub fn build_surface(
    quotes: &[OptionQuote],
    spot: f64,
    config: &SurfaceConfig,
) -> crate::error::Result<SurfaceBuild> {
    config.validate()?;
    validate_positive(spot, "spot")?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_quotes = quotes.len(),
        spot,
        min_volume = config.min_volume,
        "surface build started"
    );

    let mut diagnostics = BuildDiagnostics {
        input_quotes: quotes.len(),
        ..Default::default()
    };

    let mut survivors: Vec<&OptionQuote> = Vec::with_capacity(quotes.len());
    for quote in quotes {
        match screen(quote, config) {
            None => survivors.push(quote),
            Some(Exclusion::Malformed) => diagnostics.excluded_malformed += 1,
            Some(Exclusion::Volume) => diagnostics.excluded_by_volume += 1,
            Some(Exclusion::Strike) => diagnostics.excluded_by_strike += 1,
            Some(Exclusion::Expiry) => diagnostics.excluded_by_expiry += 1,
            Some(Exclusion::Price) => diagnostics.excluded_by_price += 1,
        }
    }
    survivors.sort_by(|a, b| {
        a.expiry
            .total_cmp(&b.expiry)
            .then(a.strike.total_cmp(&b.strike))
            .then(otm_rank(a, spot).cmp(&otm_rank(b, spot)))
    });
    diagnostics.solved = survivors.len();

    let solver = ImpliedVolSolver::new(config.solver)?;
    let (rate, q) = (config.rate, config.dividend_yield);

    #[cfg(feature = "parallel")]
    let results: Vec<IvResult<'_>> = survivors
        .par_iter()
        .map(|&quote| solver.solve(quote, rate, q))
        .collect::<crate::error::Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let results: Vec<IvResult<'_>> = survivors
        .iter()
        .map(|&quote| solver.solve(quote, rate, q))
        .collect::<crate::error::Result<Vec<_>>>()?;

    let mut candidates: Vec<Candidate> = Vec::with_capacity(results.len());
    for result in &results {
        diagnostics.record(result);
        let Some(vol) = result.converged_vol() else {
            continue;
        };
        if !vol.0.is_finite() || vol.0 < 0.0 || vol.0 > config.sanity_ceiling {
            diagnostics.above_ceiling += 1;
            continue;
        }
        candidates.push(Candidate {
            strike: result.quote.strike,
            expiry: result.quote.expiry,
            vol: vol.0,
            option_type: result.quote.option_type,
        });
    }

    let points = resolve_cells(&candidates, spot, &mut diagnostics);
    diagnostics.surface_points = points.len();

    if points.len() < config.min_points {
        #[cfg(feature = "logging")]
        tracing::warn!(
            found = points.len(),
            required = config.min_points,
            excluded = diagnostics.excluded_total(),
            failed = diagnostics.failed_to_solve(),
            "insufficient data for a surface"
        );
        return Err(IvSurfError::InsufficientData {
            found: points.len(),
            required: config.min_points,
            diagnostics: Box::new(diagnostics),
        });
    }

    let grid = SurfaceGrid::new(spot, points, config.sanity_ceiling)?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_points = grid.len(),
        n_expiries = grid.expiries().len(),
        n_strikes = grid.strikes().len(),
        excluded = diagnostics.excluded_total(),
        failed = diagnostics.failed_to_solve(),
        "surface build complete"
    );

    Ok(SurfaceBuild { grid, diagnostics })
}

/// 0 for the out-of-the-money side, 1 otherwise.
fn otm_rank(quote: &OptionQuote, spot: f64) -> u8 {
    u8::from(!quote.option_type.is_otm(spot, quote.strike))
}

/// Collapse candidates sharing a cell into one point.
///
/// `candidates` must be sorted by (expiry, strike).
fn resolve_cells(
    candidates: &[Candidate],
    spot: f64,
    diagnostics: &mut BuildDiagnostics,
) -> Vec<SurfacePoint> {
    candidates
        .chunk_by(|a, b| a.expiry == b.expiry && a.strike == b.strike)
        .map(|cell| {
            diagnostics.merged_duplicates += cell.len() - 1;
            let head = cell[0];
            let otm: Vec<f64> = cell
                .iter()
                .filter(|c| c.option_type.is_otm(spot, c.strike))
                .map(|c| c.vol)
                .collect();
            let mut chosen: Vec<f64> = if otm.is_empty() {
                cell.iter().map(|c| c.vol).collect()
            } else {
                otm
            };
            // Fixed summation order keeps the mean bit-identical across input orders.
            chosen.sort_by(f64::total_cmp);
            SurfacePoint {
                strike: head.strike,
                expiry: head.expiry,
                vol: chosen.iter().sum::<f64>() / chosen.len() as f64,
            }
        })
        .collect()
}
