//! The implied volatility grid: (expiry, strike) → σ.
//!
//! Grids are irregular: each expiry row only holds the strikes that produced
//! a usable volatility. [`SurfaceGrid::matrix`] exposes the dense
//! expiry × strike layout with `None` holes for plotting, and
//! [`SurfaceGrid::rows`] the flattened view used for CSV export.

use serde::{Deserialize, Serialize};

use crate::conventions::moneyness;
use crate::error::IvSurfError;
use crate::surface::interp::interpolate_row;
use crate::types::Vol;
use crate::validate::{validate_non_negative, validate_positive};

/// Tolerance for matching a requested expiry or strike to an axis value.
const AXIS_TOL: f64 = 1e-10;

/// One populated grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Strike price.
    pub strike: f64,
    /// Time to expiry in years.
    pub expiry: f64,
    /// Implied volatility.
    pub vol: f64,
}

/// One row of the flattened tabular view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRow {
    pub strike: f64,
    pub expiry: f64,
    /// `strike / spot`
    pub moneyness: f64,
    pub implied_vol: f64,
}

/// Immutable implied volatility surface grid.
///
/// Invariants, checked on construction and deserialization:
/// - spot is positive and finite
/// - every cell holds a finite volatility in `[0, sanity_ceiling]`
/// - no two points share a (strike, expiry) cell
/// - axes are the sorted unique strikes and expiries of the points
///
/// # Examples
/// ```
/// use ivsurf::surface::{SurfaceGrid, SurfacePoint};
///
/// let points = vec![
///     SurfacePoint { strike: 90.0, expiry: 0.25, vol: 0.24 },
///     SurfacePoint { strike: 100.0, expiry: 0.25, vol: 0.20 },
///     SurfacePoint { strike: 100.0, expiry: 0.50, vol: 0.21 },
/// ];
/// let grid = SurfaceGrid::new(100.0, points, 5.0)?;
/// assert_eq!(grid.strikes(), &[90.0, 100.0]);
/// assert_eq!(grid.expiries(), &[0.25, 0.50]);
/// assert!(grid.vol(1, 0).is_none()); // no 90-strike quote at 6M
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceGridRaw", into = "SurfaceGridRaw")]
pub struct SurfaceGrid {
    spot: f64,
    sanity_ceiling: f64,
    strikes: Vec<f64>,
    expiries: Vec<f64>,
    /// Sorted by (expiry, strike).
    points: Vec<SurfacePoint>,
    /// Row-major `expiries.len() × strikes.len()`.
    cells: Vec<Option<f64>>,
}

#[derive(Serialize, Deserialize)]
struct SurfaceGridRaw {
    spot: f64,
    sanity_ceiling: f64,
    points: Vec<SurfacePoint>,
}

impl TryFrom<SurfaceGridRaw> for SurfaceGrid {
    type Error = IvSurfError;
    fn try_from(raw: SurfaceGridRaw) -> Result<Self, Self::Error> {
        Self::new(raw.spot, raw.points, raw.sanity_ceiling)
    }
}

impl From<SurfaceGrid> for SurfaceGridRaw {
    fn from(g: SurfaceGrid) -> Self {
        Self {
            spot: g.spot,
            sanity_ceiling: g.sanity_ceiling,
            points: g.points,
        }
    }
}

impl SurfaceGrid {
    /// Assemble a grid from populated cells.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if the spot or any point is
    /// malformed, a volatility breaks the sanity ceiling, or two points
    /// occupy the same cell.
    pub fn new(
        spot: f64,
        mut points: Vec<SurfacePoint>,
        sanity_ceiling: f64,
    ) -> crate::error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_positive(sanity_ceiling, "sanity_ceiling")?;
        for p in &points {
            validate_positive(p.strike, "strike")?;
            validate_non_negative(p.expiry, "expiry")?;
            validate_non_negative(p.vol, "vol")?;
            if p.vol > sanity_ceiling {
                return Err(IvSurfError::InvalidInput {
                    message: format!(
                        "vol {} at strike {} expiry {} exceeds sanity ceiling {sanity_ceiling}",
                        p.vol, p.strike, p.expiry
                    ),
                });
            }
        }

        points.sort_by(|a, b| {
            a.expiry
                .total_cmp(&b.expiry)
                .then(a.strike.total_cmp(&b.strike))
        });
        if let Some(w) = points
            .windows(2)
            .find(|w| w[0].expiry == w[1].expiry && w[0].strike == w[1].strike)
        {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "duplicate cell at strike {} expiry {}",
                    w[0].strike, w[0].expiry
                ),
            });
        }

        let mut strikes: Vec<f64> = points.iter().map(|p| p.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        let mut expiries: Vec<f64> = points.iter().map(|p| p.expiry).collect();
        expiries.dedup();

        let mut cells = vec![None; expiries.len() * strikes.len()];
        for p in &points {
            let row = expiries.partition_point(|&t| t < p.expiry);
            let col = strikes.partition_point(|&k| k < p.strike);
            cells[row * strikes.len() + col] = Some(p.vol);
        }

        Ok(Self {
            spot,
            sanity_ceiling,
            strikes,
            expiries,
            points,
            cells,
        })
    }

    /// Underlying spot of the snapshot the grid was built from.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Upper volatility bound every cell respects.
    pub fn sanity_ceiling(&self) -> f64 {
        self.sanity_ceiling
    }

    /// Sorted unique strikes.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Sorted unique expiries (years).
    pub fn expiries(&self) -> &[f64] {
        &self.expiries
    }

    /// Populated cells sorted by (expiry, strike).
    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid has no populated cells.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cell at axis indices, `None` when out of range or unpopulated.
    pub fn vol(&self, expiry_idx: usize, strike_idx: usize) -> Option<Vol> {
        if expiry_idx >= self.expiries.len() || strike_idx >= self.strikes.len() {
            return None;
        }
        self.cells[expiry_idx * self.strikes.len() + strike_idx].map(Vol)
    }

    /// Cell at an (expiry, strike) pair matching axis values within 1e-10.
    pub fn vol_at(&self, expiry: f64, strike: f64) -> Option<Vol> {
        let row = self.expiry_index(expiry)?;
        let col = axis_index(&self.strikes, strike)?;
        self.vol(row, col)
    }

    /// Axis index of an expiry, matched within 1e-10.
    pub fn expiry_index(&self, expiry: f64) -> Option<usize> {
        axis_index(&self.expiries, expiry)
    }

    /// Populated `(strike, vol)` pairs of one expiry, sorted by strike.
    /// Empty when the expiry is not on the axis.
    pub fn smile(&self, expiry: f64) -> Vec<(f64, f64)> {
        match self.expiry_index(expiry) {
            Some(row) => self
                .strikes
                .iter()
                .enumerate()
                .filter_map(|(col, &k)| self.vol(row, col).map(|v| (k, v.0)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Linear-in-strike volatility on one expiry row, flat beyond the
    /// outermost populated strikes. `None` when the row is empty.
    pub fn interpolate_smile(&self, expiry: f64, strike: f64) -> Option<Vol> {
        interpolate_row(&self.smile(expiry), strike).map(Vol)
    }

    /// Dense expiry × strike matrix with `None` for unpopulated cells.
    pub fn matrix(&self) -> Vec<Vec<Option<f64>>> {
        self.cells
            .chunks(self.strikes.len().max(1))
            .take(self.expiries.len())
            .map(<[Option<f64>]>::to_vec)
            .collect()
    }

    /// Flattened tabular view, ordered by (expiry, strike).
    pub fn rows(&self) -> Vec<SurfaceRow> {
        self.points
            .iter()
            .map(|p| SurfaceRow {
                strike: p.strike,
                expiry: p.expiry,
                moneyness: moneyness(p.strike, self.spot),
                implied_vol: p.vol,
            })
            .collect()
    }

    /// Write [`rows`](Self::rows) as CSV with a header line.
    ///
    /// # Errors
    /// Returns [`IvSurfError::Csv`] if serialization or the writer fails.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> crate::error::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

fn axis_index(axis: &[f64], value: f64) -> Option<usize> {
    let i = axis.partition_point(|&x| x < value - AXIS_TOL);
    (i < axis.len() && (axis[i] - value).abs() < AXIS_TOL).then_some(i)
}
