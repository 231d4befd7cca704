//! Configuration passed explicitly into every core call.
//!
//! Nothing in the crate reads process-wide state: the same process can build
//! surfaces with different parameters side by side. All rates, yields and
//! volatilities are decimals (0.015 = 1.5%), expiries are years, and strike
//! bounds are multipliers of spot.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial document
//! only overrides what it names:
//!
//! ```
//! use ivsurf::config::SurfaceConfig;
//!
//! let cfg: SurfaceConfig = serde_json::from_str(r#"{ "min_volume": 50 }"#)?;
//! assert_eq!(cfg.min_volume, 50);
//! assert_eq!(cfg.rate, SurfaceConfig::default().rate);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::IvSurfError;
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Implied volatility solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower end of the volatility search bracket. Default 0.001 (0.1%).
    pub vol_lower: f64,
    /// Upper end of the volatility search bracket. Default 5.0 (500%).
    pub vol_upper: f64,
    /// Convergence threshold on bracket width. Default 1e-6.
    pub tolerance: f64,
    /// Iteration cap. Default 100.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            vol_lower: 0.001,
            vol_upper: 5.0,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    /// Check the bracket is ordered and positive and the stopping rule is usable.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_positive(self.vol_lower, "vol_lower")?;
        validate_positive(self.vol_upper, "vol_upper")?;
        validate_positive(self.tolerance, "tolerance")?;
        if self.vol_lower >= self.vol_upper {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "vol_lower ({}) must be below vol_upper ({})",
                    self.vol_lower, self.vol_upper
                ),
            });
        }
        if self.max_iterations == 0 {
            return Err(IvSurfError::InvalidInput {
                message: "max_iterations must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Largest accepted magnitude for a rate or yield.
const MAX_RATE_MAGNITUDE: f64 = 1.0;

/// Surface construction settings: model parameters, quote filters and the
/// acceptance rules for solved volatilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Continuously compounded risk-free rate. Default 0.015.
    ///
    /// Negative rates are accepted. Magnitudes above 1.0 are rejected as a
    /// likely percent-for-decimal mistake.
    pub rate: f64,
    /// Continuous dividend yield. Default 0.013.
    ///
    /// Negative yields (net borrow cost) are accepted; the magnitude must not
    /// exceed 1.0.
    pub dividend_yield: f64,
    /// Lowest accepted strike as a multiple of spot. Default 0.75.
    pub min_moneyness: f64,
    /// Highest accepted strike as a multiple of spot. Default 1.25.
    pub max_moneyness: f64,
    /// Quotes with lower traded volume are excluded. Default 10.
    pub min_volume: u64,
    /// Quotes expiring sooner (years) are excluded. Default 7/365.
    pub min_expiry: f64,
    /// Quotes priced lower are excluded. Default 0.01.
    pub min_price: f64,
    /// Largest plausible implied volatility kept on the grid. Default 5.0.
    pub sanity_ceiling: f64,
    /// Fewest grid cells that still make a surface. Default 10.
    pub min_points: usize,
    /// Solver settings used for every quote.
    pub solver: SolverConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            rate: 0.015,
            dividend_yield: 0.013,
            min_moneyness: 0.75,
            max_moneyness: 1.25,
            min_volume: 10,
            min_expiry: 7.0 / 365.0,
            min_price: 0.01,
            sanity_ceiling: 5.0,
            min_points: 10,
            solver: SolverConfig::default(),
        }
    }
}

impl SurfaceConfig {
    /// Validate every field, including the nested solver settings.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (value, name) in [(self.rate, "rate"), (self.dividend_yield, "dividend_yield")] {
            validate_finite(value, name)?;
            if value.abs() > MAX_RATE_MAGNITUDE {
                return Err(IvSurfError::InvalidInput {
                    message: format!(
                        "{name} ({value}) is outside [-{MAX_RATE_MAGNITUDE}, {MAX_RATE_MAGNITUDE}]; \
                         rates are decimals (0.05 = 5%)"
                    ),
                });
            }
        }
        validate_non_negative(self.min_moneyness, "min_moneyness")?;
        validate_positive(self.max_moneyness, "max_moneyness")?;
        if self.min_moneyness >= self.max_moneyness {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "min_moneyness ({}) must be below max_moneyness ({})",
                    self.min_moneyness, self.max_moneyness
                ),
            });
        }
        validate_non_negative(self.min_expiry, "min_expiry")?;
        validate_non_negative(self.min_price, "min_price")?;
        validate_positive(self.sanity_ceiling, "sanity_ceiling")?;
        if self.min_points == 0 {
            return Err(IvSurfError::InvalidInput {
                message: "min_points must be at least 1".into(),
            });
        }
        self.solver.validate()
    }
}

/// Surface analytics settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Tenor (years) whose nearest expiry is used for skew. Default 30/365.
    pub reference_tenor: f64,
    /// Moneyness of the low (put-side) skew strike. Default 0.90.
    pub skew_low_moneyness: f64,
    /// Moneyness of the high (call-side) skew strike. Default 1.10.
    pub skew_high_moneyness: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            reference_tenor: 30.0 / 365.0,
            skew_low_moneyness: 0.90,
            skew_high_moneyness: 1.10,
        }
    }
}

impl AnalyticsConfig {
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for a non-positive tenor or
    /// unordered skew strikes.
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_non_negative(self.reference_tenor, "reference_tenor")?;
        validate_positive(self.skew_low_moneyness, "skew_low_moneyness")?;
        validate_positive(self.skew_high_moneyness, "skew_high_moneyness")?;
        if self.skew_low_moneyness >= self.skew_high_moneyness {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "skew_low_moneyness ({}) must be below skew_high_moneyness ({})",
                    self.skew_low_moneyness, self.skew_high_moneyness
                ),
            });
        }
        Ok(())
    }
}
