//! # ivsurf
//!
//! Implied volatility surface engine for listed equity options.
//!
//! Provides the full pipeline: option chain snapshot → quote cleaning →
//! Black-Scholes implied volatility extraction → (expiry, strike) surface
//! grid → ATM term structure and skew analytics.
//!
//! ## Architecture
//!
//! - **`pricing`**: Black-Scholes prices and Greeks with continuous dividend yield
//! - **`implied`**: Bracketed implied volatility solver with per-quote status
//! - **`surface`**: Quote screening, parallel solving and grid assembly
//! - **`analytics`**: ATM vol, term structure, slope and skew
//! - **`chain`**: Market data snapshots and the source abstraction
//! - **`config`**: Explicit, serializable parameter objects
//!
//! ## Design
//!
//! - **Explicit configuration.** Every core call takes its parameters as a
//!   value; there is no process-wide state.
//! - **Non-convergence is data.** The solver reports a [`SolverStatus`] per
//!   quote and the builder tallies outcomes in [`BuildDiagnostics`]. Only
//!   malformed inputs and run-level failures are [`IvSurfError`]s.
//! - **No panics.** Library code never calls `unwrap()` or `expect()`.
//! - **Deterministic.** Quotes are solved independently (in parallel with the
//!   `parallel` feature) and reduced in sorted order, so the surface does not
//!   depend on input order or thread scheduling.
//! - **Serializable.** Configuration, grids, diagnostics and statistics
//!   implement Serde `Serialize` / `Deserialize`; grids validate on
//!   deserialization.
//!
//! ## Example
//!
//! ```
//! use ivsurf::{ModelInputs, OptionQuote, OptionType, SurfaceBuilder};
//! use ivsurf::analytics::compute_stats;
//! use ivsurf::config::AnalyticsConfig;
//! use ivsurf::pricing::price;
//!
//! let spot = 100.0;
//! let mut quotes = Vec::new();
//! for days in [30.0, 60.0, 90.0] {
//!     let expiry = days / 365.0;
//!     for strike in [85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0] {
//!         let vol = 0.20 + 0.002 * (100.0 - strike);
//!         let inputs = ModelInputs {
//!             spot, strike, expiry, rate: 0.015, dividend_yield: 0.013, vol,
//!         };
//!         let p = price(&inputs, OptionType::Call)?;
//!         quotes.push(OptionQuote::new(strike, expiry, OptionType::Call, p, 100, spot));
//!     }
//! }
//!
//! let build = SurfaceBuilder::new().spot(spot).add_quotes(&quotes).build()?;
//! let stats = compute_stats(&build.grid, &AnalyticsConfig::default())?;
//! assert_eq!(stats.term_structure.len(), 3);
//! assert!(stats.skew.skew > 0.0);
//! # Ok::<(), ivsurf::IvSurfError>(())
//! ```

pub mod analytics;
pub mod chain;
pub mod config;
pub mod conventions;
pub mod error;
pub mod implied;
mod optim;
pub mod pricing;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use analytics::{SurfaceStats, compute_stats};
#[doc(inline)]
pub use chain::{OptionChain, OptionChainSource};
#[doc(inline)]
pub use config::{AnalyticsConfig, SolverConfig, SurfaceConfig};
#[doc(inline)]
pub use error::{IvSurfError, Result};
#[doc(inline)]
pub use implied::{ImpliedVolSolver, IvResult, SolverStatus};
#[doc(inline)]
pub use surface::{BuildDiagnostics, SurfaceBuild, SurfaceBuilder, SurfaceGrid, build_surface};
#[doc(inline)]
pub use types::{ModelInputs, OptionQuote, OptionType, Vol};
