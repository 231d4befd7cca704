//! Summary statistics read off a finished [`SurfaceGrid`].
//!
//! All lookups interpolate linearly in strike along a single expiry row and
//! hold the outermost populated value flat beyond the row's strike range.
//! Nothing is extrapolated and nothing is interpolated across expiries.

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::IvSurfError;
use crate::surface::SurfaceGrid;
use crate::surface::interp::{interpolate_row, nearest_index};
use crate::types::Vol;
use crate::validate::{validate_finite, validate_positive};

/// ATM implied volatility of one expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmPoint {
    /// Time to expiry in years.
    pub expiry: f64,
    /// Implied volatility at the spot strike.
    pub vol: f64,
}

/// Fixed-moneyness skew on one expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skew {
    /// Expiry the skew was read from: the one nearest the reference tenor.
    pub expiry: f64,
    pub low_strike: f64,
    pub high_strike: f64,
    pub low_vol: f64,
    pub high_vol: f64,
    /// `low_vol − high_vol`. Positive for the usual equity put skew.
    pub skew: f64,
}

/// Headline statistics of a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceStats {
    /// ATM vol per expiry, ordered by expiry.
    pub term_structure: Vec<AtmPoint>,
    pub skew: Skew,
    /// Mean forward difference of the term structure; `None` with a single expiry.
    pub term_structure_slope: Option<f64>,
}

/// Implied volatility at `strike` on the `expiry` row.
///
/// # Errors
/// Returns [`IvSurfError::EmptySurface`] when `expiry` is not on the grid's
/// expiry axis (and so has no populated cells), and
/// [`IvSurfError::InvalidInput`] for a non-positive strike.
pub fn vol_at_strike(grid: &SurfaceGrid, expiry: f64, strike: f64) -> crate::error::Result<Vol> {
    validate_positive(strike, "strike")?;
    validate_finite(expiry, "expiry")?;
    interpolate_row(&grid.smile(expiry), strike)
        .map(Vol)
        .ok_or(IvSurfError::EmptySurface { expiry })
}

/// At-the-money implied volatility on the `expiry` row.
///
/// Interpolates between the two strikes bracketing the grid's spot, or takes
/// the nearest strike when spot lies outside the row.
///
/// # Errors
/// Returns [`IvSurfError::EmptySurface`] when the expiry has no populated cells.
///
/// # Examples
/// ```
/// use ivsurf::analytics::atm_vol;
/// use ivsurf::surface::{SurfaceGrid, SurfacePoint};
///
/// let grid = SurfaceGrid::new(
///     102.0,
///     vec![
///         SurfacePoint { strike: 100.0, expiry: 0.5, vol: 0.20 },
///         SurfacePoint { strike: 105.0, expiry: 0.5, vol: 0.18 },
///     ],
///     5.0,
/// )?;
/// let atm = atm_vol(&grid, 0.5)?;
/// assert!((atm.0 - 0.192).abs() < 1e-12);
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
pub fn atm_vol(grid: &SurfaceGrid, expiry: f64) -> crate::error::Result<Vol> {
    vol_at_strike(grid, expiry, grid.spot())
}

/// ATM vol for every expiry on the grid, ordered by expiry.
///
/// # Errors
/// Propagates [`atm_vol`] failures, which a grid built by
/// [`SurfaceGrid::new`] cannot produce since every axis expiry holds a point.
pub fn term_structure(grid: &SurfaceGrid) -> crate::error::Result<Vec<AtmPoint>> {
    grid.expiries()
        .iter()
        .map(|&expiry| {
            atm_vol(grid, expiry).map(|v| AtmPoint {
                expiry,
                vol: v.0,
            })
        })
        .collect()
}

/// Mean forward difference of ATM vol across consecutive expiries.
///
/// Equals `(last − first) / (n − 1)`, the average vol change per step of the
/// expiry axis. `None` with fewer than two points.
pub fn term_structure_slope(points: &[AtmPoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let total: f64 = points.windows(2).map(|w| w[1].vol - w[0].vol).sum();
    Some(total / (points.len() - 1) as f64)
}

/// Skew at the expiry nearest `config.reference_tenor`.
///
/// # Errors
/// Returns [`IvSurfError::EmptySurface`] when the grid has no expiries, and
/// [`IvSurfError::InvalidInput`] for an invalid configuration.
pub fn skew(grid: &SurfaceGrid, config: &AnalyticsConfig) -> crate::error::Result<Skew> {
    config.validate()?;
    let idx = nearest_index(grid.expiries(), config.reference_tenor).ok_or(
        IvSurfError::EmptySurface {
            expiry: config.reference_tenor,
        },
    )?;
    let expiry = grid.expiries()[idx];

    let low_strike = grid.spot() * config.skew_low_moneyness;
    let high_strike = grid.spot() * config.skew_high_moneyness;
    let low_vol = vol_at_strike(grid, expiry, low_strike)?.0;
    let high_vol = vol_at_strike(grid, expiry, high_strike)?.0;

    Ok(Skew {
        expiry,
        low_strike,
        high_strike,
        low_vol,
        high_vol,
        skew: low_vol - high_vol,
    })
}

/// Term structure, its slope and the reference skew in one pass.
///
/// # Errors
/// Returns [`IvSurfError::EmptySurface`] for a grid without points.
pub fn compute_stats(
    grid: &SurfaceGrid,
    config: &AnalyticsConfig,
) -> crate::error::Result<SurfaceStats> {
    let term_structure = term_structure(grid)?;
    let skew = skew(grid, config)?;
    let term_structure_slope = term_structure_slope(&term_structure);

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_expiries = term_structure.len(),
        skew_expiry = skew.expiry,
        skew = skew.skew,
        slope = term_structure_slope,
        "surface stats computed"
    );

    Ok(SurfaceStats {
        term_structure,
        skew,
        term_structure_slope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfacePoint;
    use approx::assert_abs_diff_eq;

    fn pt(strike: f64, expiry: f64, vol: f64) -> SurfacePoint {
        SurfacePoint {
            strike,
            expiry,
            vol,
        }
    }

    /// Three expiries, downward-sloping smiles, rising ATM term structure.
    fn grid() -> SurfaceGrid {
        let mut points = Vec::new();
        for (t, base) in [(30.0 / 365.0, 0.20), (60.0 / 365.0, 0.22), (90.0 / 365.0, 0.25)] {
            for (k, bump) in [(85.0, 0.06), (90.0, 0.04), (100.0, 0.0), (110.0, -0.02), (115.0, -0.03)] {
                points.push(pt(k, t, base + bump));
            }
        }
        SurfaceGrid::new(100.0, points, 5.0).unwrap()
    }

    #[test]
    fn atm_is_exact_when_spot_is_a_strike() {
        let g = grid();
        assert_abs_diff_eq!(atm_vol(&g, 60.0 / 365.0).unwrap().0, 0.22, epsilon = 1e-12);
    }

    #[test]
    fn atm_interpolates_between_bracketing_strikes() {
        let g = SurfaceGrid::new(
            103.0,
            vec![pt(100.0, 0.5, 0.20), pt(110.0, 0.5, 0.30)],
            5.0,
        )
        .unwrap();
        assert_abs_diff_eq!(atm_vol(&g, 0.5).unwrap().0, 0.23, epsilon = 1e-12);
    }

    #[test]
    fn atm_uses_nearest_strike_outside_range() {
        let g = SurfaceGrid::new(
            130.0,
            vec![pt(100.0, 0.5, 0.20), pt(110.0, 0.5, 0.30)],
            5.0,
        )
        .unwrap();
        assert_eq!(atm_vol(&g, 0.5).unwrap(), Vol(0.30));
    }

    #[test]
    fn missing_expiry_is_empty_surface() {
        let err = atm_vol(&grid(), 2.0).unwrap_err();
        match err {
            IvSurfError::EmptySurface { expiry } => assert_eq!(expiry, 2.0),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn term_structure_is_ordered_with_slope() {
        let ts = term_structure(&grid()).unwrap();
        let vols: Vec<f64> = ts.iter().map(|p| p.vol).collect();
        assert_eq!(ts.len(), 3);
        assert!(ts.windows(2).all(|w| w[0].expiry < w[1].expiry));
        assert_abs_diff_eq!(vols[0], 0.20, epsilon = 1e-12);
        assert_abs_diff_eq!(vols[2], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(term_structure_slope(&ts).unwrap(), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn slope_needs_two_points() {
        assert_eq!(term_structure_slope(&[]), None);
        assert_eq!(
            term_structure_slope(&[AtmPoint {
                expiry: 0.5,
                vol: 0.2
            }]),
            None
        );
    }

    #[test]
    fn skew_reads_nearest_expiry_to_reference_tenor() {
        let cfg = AnalyticsConfig {
            reference_tenor: 55.0 / 365.0,
            ..Default::default()
        };
        let s = skew(&grid(), &cfg).unwrap();
        assert_abs_diff_eq!(s.expiry, 60.0 / 365.0, epsilon = 1e-15);
        assert_abs_diff_eq!(s.low_strike, 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.high_strike, 110.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.low_vol, 0.26, epsilon = 1e-12);
        assert_abs_diff_eq!(s.high_vol, 0.20, epsilon = 1e-12);
        assert_abs_diff_eq!(s.skew, 0.06, epsilon = 1e-12);
    }

    #[test]
    fn stats_bundle_everything() {
        let stats = compute_stats(&grid(), &AnalyticsConfig::default()).unwrap();
        assert_eq!(stats.term_structure.len(), 3);
        assert_abs_diff_eq!(stats.skew.expiry, 30.0 / 365.0, epsilon = 1e-15);
        assert!(stats.skew.skew > 0.0);
        assert!(stats.term_structure_slope.unwrap() > 0.0);
    }

    #[test]
    fn empty_grid_has_no_stats() {
        let g = SurfaceGrid::new(100.0, Vec::new(), 5.0).unwrap();
        assert!(matches!(
            compute_stats(&g, &AnalyticsConfig::default()),
            Err(IvSurfError::EmptySurface { .. })
        ));
    }

    #[test]
    fn stats_serialize() {
        let stats = compute_stats(&grid(), &AnalyticsConfig::default()).unwrap();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("term_structure_slope"));
    }
}
