//! Core domain types for implied volatility surface construction.
//!
//! Solved volatilities come back as [`Vol`]. Quotes and model inputs are
//! plain structs with named `f64` fields.
//!
//! # Why no `Eq` or `Ord`?
//! These types hold `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only. Sorting
//! inside the crate uses `f64::total_cmp`.

use serde::{Deserialize, Serialize};

use crate::conventions;

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// A vol of 0.20 represents 20% annualized volatility.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// Intrinsic (immediate exercise) value: `max(S − K, 0)` for calls,
    /// `max(K − S, 0)` for puts.
    ///
    /// # Examples
    /// ```
    /// use ivsurf::OptionType;
    /// assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
    /// assert_eq!(OptionType::Put.intrinsic(110.0, 100.0), 0.0);
    /// ```
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Whether an option of this type is out of the money at `spot`.
    ///
    /// At-the-money (`strike == spot`) counts as out of the money for both.
    pub fn is_otm(self, spot: f64, strike: f64) -> bool {
        match self {
            OptionType::Call => strike >= spot,
            OptionType::Put => strike <= spot,
        }
    }
}

/// One observed market data point from an option chain snapshot.
///
/// Produced by the market data boundary ([`crate::chain`]) and consumed by the
/// surface builder. Plain value type: copy it, never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price, in the same currency as `spot` and `price`.
    pub strike: f64,
    /// Time to expiry in years.
    pub expiry: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Observed mid (or last) price.
    pub price: f64,
    /// Traded volume.
    pub volume: u64,
    /// Underlying spot price at snapshot time.
    pub spot: f64,
}

impl OptionQuote {
    /// Create a quote.
    ///
    /// No validation happens here. The solver rejects malformed values and the
    /// surface builder filters them out before solving.
    pub fn new(
        strike: f64,
        expiry: f64,
        option_type: OptionType,
        price: f64,
        volume: u64,
        spot: f64,
    ) -> Self {
        Self {
            strike,
            expiry,
            option_type,
            price,
            volume,
            spot,
        }
    }

    /// Simple moneyness `K / S`.
    pub fn moneyness(&self) -> f64 {
        conventions::moneyness(self.strike, self.spot)
    }

    /// Intrinsic value of this quote at its snapshot spot.
    pub fn intrinsic(&self) -> f64 {
        self.option_type.intrinsic(self.spot, self.strike)
    }
}

/// The six Black-Scholes parameters.
///
/// `vol` is the known input when pricing forward and the unknown when the
/// implied volatility solver prices in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelInputs {
    /// Spot price `S` (> 0).
    pub spot: f64,
    /// Strike `K` (> 0).
    pub strike: f64,
    /// Time to expiry `T` in years (≥ 0).
    pub expiry: f64,
    /// Continuously compounded risk-free rate `r`.
    pub rate: f64,
    /// Continuous dividend yield `q`.
    pub dividend_yield: f64,
    /// Volatility `σ`.
    pub vol: f64,
}

impl ModelInputs {
    /// Model inputs for a quote at a trial volatility.
    pub fn from_quote(quote: &OptionQuote, rate: f64, dividend_yield: f64, vol: f64) -> Self {
        Self {
            spot: quote.spot,
            strike: quote.strike,
            expiry: quote.expiry,
            rate,
            dividend_yield,
            vol,
        }
    }

    /// Copy of these inputs with a different volatility.
    pub fn with_vol(self, vol: f64) -> Self {
        Self { vol, ..self }
    }
}
