//! Black-Scholes-Merton pricing of European options.
//!
//! # Formula
//! ```text
//! C = S·e^(−qT)·Φ(d1) − K·e^(−rT)·Φ(d2)
//! P = K·e^(−rT)·Φ(−d2) − S·e^(−qT)·Φ(−d1)
//! d1 = [ln(S/K) + (r − q + σ²/2)·T] / (σ√T)
//! d2 = d1 − σ√T
//! ```
//!
//! At `T = 0` and for `σ ≤ 0` the price collapses to intrinsic value instead
//! of evaluating `d1`/`d2`, which would divide by zero.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use crate::conventions::{discount_factor, forward_price, log_moneyness};
use crate::types::{ModelInputs, OptionType};
use crate::validate::validate_model_inputs;

/// Standard normal cumulative distribution function Φ(x).
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density φ(x).
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// The `d1` term. Only meaningful for `T > 0` and `σ > 0`.
pub fn d1(inputs: &ModelInputs) -> f64 {
    let ModelInputs {
        spot,
        strike,
        expiry,
        rate,
        dividend_yield,
        vol,
    } = *inputs;
    let forward = forward_price(spot, rate, dividend_yield, expiry);
    (0.5 * vol * vol * expiry - log_moneyness(strike, forward)) / (vol * expiry.sqrt())
}

/// The `d2 = d1 − σ√T` term. Only meaningful for `T > 0` and `σ > 0`.
pub fn d2(inputs: &ModelInputs) -> f64 {
    d1(inputs) - inputs.vol * inputs.expiry.sqrt()
}

/// Black-Scholes price of a European option.
///
/// # Errors
/// Returns [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput)
/// when spot or strike is not positive, expiry is negative, or any input is
/// non-finite.
///
/// # Examples
/// ```
/// use ivsurf::pricing::price;
/// use ivsurf::types::{ModelInputs, OptionType};
///
/// let inputs = ModelInputs {
///     spot: 100.0, strike: 100.0, expiry: 0.5,
///     rate: 0.05, dividend_yield: 0.0, vol: 0.20,
/// };
/// let call = price(&inputs, OptionType::Call)?;
/// assert!((call - 6.8887).abs() < 1e-3);
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
pub fn price(inputs: &ModelInputs, option_type: OptionType) -> crate::error::Result<f64> {
    validate_model_inputs(inputs)?;
    Ok(price_unchecked(inputs, option_type))
}

/// Pricing kernel shared with the implied volatility solver, which validates
/// once and then evaluates many trial volatilities.
pub(crate) fn price_unchecked(inputs: &ModelInputs, option_type: OptionType) -> f64 {
    if inputs.expiry == 0.0 || inputs.vol <= 0.0 {
        return option_type.intrinsic(inputs.spot, inputs.strike);
    }

    let d1 = d1(inputs);
    let d2 = d1 - inputs.vol * inputs.expiry.sqrt();
    let spot_df = inputs.spot * discount_factor(inputs.dividend_yield, inputs.expiry);
    let strike_df = inputs.strike * discount_factor(inputs.rate, inputs.expiry);

    match option_type {
        OptionType::Call => spot_df * norm_cdf(d1) - strike_df * norm_cdf(d2),
        OptionType::Put => strike_df * norm_cdf(-d2) - spot_df * norm_cdf(-d1),
    }
}

/// First-order sensitivities plus gamma.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ per unit of volatility (1.0 = 100 vol points).
    pub vega: f64,
    /// ∂V/∂t per year of calendar time (negative for decaying options).
    pub theta: f64,
    /// ∂V/∂r per unit of rate.
    pub rho: f64,
}

/// Black-Scholes Greeks of a European option.
///
/// At `T = 0` or `σ ≤ 0` delta is the exercise indicator and every other
/// sensitivity is zero.
///
/// # Errors
/// Same input checks as [`price`].
pub fn greeks(inputs: &ModelInputs, option_type: OptionType) -> crate::error::Result<Greeks> {
    validate_model_inputs(inputs)?;

    let ModelInputs {
        spot,
        strike,
        expiry,
        rate,
        dividend_yield,
        vol,
    } = *inputs;

    if expiry == 0.0 || vol <= 0.0 {
        let delta = match option_type {
            OptionType::Call if spot > strike => 1.0,
            OptionType::Put if spot < strike => -1.0,
            _ => 0.0,
        };
        return Ok(Greeks {
            delta,
            ..Default::default()
        });
    }

    let sqrt_t = expiry.sqrt();
    let d1 = d1(inputs);
    let d2 = d1 - vol * sqrt_t;
    let div_df = discount_factor(dividend_yield, expiry);
    let rate_df = discount_factor(rate, expiry);
    let pdf_d1 = norm_pdf(d1);

    let gamma = div_df * pdf_d1 / (spot * vol * sqrt_t);
    let vega = spot * div_df * pdf_d1 * sqrt_t;
    let decay = -spot * div_df * pdf_d1 * vol / (2.0 * sqrt_t);

    let greeks = match option_type {
        OptionType::Call => Greeks {
            delta: div_df * norm_cdf(d1),
            gamma,
            vega,
            theta: decay - rate * strike * rate_df * norm_cdf(d2)
                + dividend_yield * spot * div_df * norm_cdf(d1),
            rho: strike * expiry * rate_df * norm_cdf(d2),
        },
        OptionType::Put => Greeks {
            delta: div_df * (norm_cdf(d1) - 1.0),
            gamma,
            vega,
            theta: decay + rate * strike * rate_df * norm_cdf(-d2)
                - dividend_yield * spot * div_df * norm_cdf(-d1),
            rho: -strike * expiry * rate_df * norm_cdf(-d2),
        },
    };
    Ok(greeks)
}
