//! Implied volatility surface construction.
//!
//! A surface maps (expiry, strike) → implied vol. It is built from raw
//! quotes in four stages: screening, per-quote inversion, cell resolution
//! and grid assembly.
//!
//! - [`SurfaceBuilder`] / [`build_surface`]: the construction pipeline
//! - [`SurfaceGrid`]: the immutable result, with tabular and CSV export
//! - [`BuildDiagnostics`]: why each input quote did or did not make it

pub mod builder;
pub mod diagnostics;
pub mod grid;
pub(crate) mod interp;

pub use builder::{SurfaceBuild, SurfaceBuilder, build_surface};
pub use diagnostics::{BuildDiagnostics, NonConvergentQuote};
pub use grid::{SurfaceGrid, SurfacePoint, SurfaceRow};
