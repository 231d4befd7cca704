//! Closed-form option pricing.
//!
//! - [`black_scholes`]: European Black-Scholes-Merton price and Greeks with
//!   a continuous dividend yield

pub mod black_scholes;

pub use black_scholes::{Greeks, greeks, norm_cdf, norm_pdf, price};
