//! Input validation helpers.
//!
//! Every check uses `!is_finite()` first so NaN, +Inf and -Inf are rejected
//! uniformly, whatever the sign requirement.

use crate::error::IvSurfError;
use crate::types::{ModelInputs, OptionQuote};

/// Reject NaN/Inf, zero and negatives.
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Reject NaN/Inf and negatives.
pub(crate) fn validate_non_negative(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Reject NaN/Inf; zero and negatives allowed (rates, yields).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Spot and strike positive, expiry non-negative, rate/yield/vol finite.
pub(crate) fn validate_model_inputs(inputs: &ModelInputs) -> crate::error::Result<()> {
    validate_positive(inputs.spot, "spot")?;
    validate_positive(inputs.strike, "strike")?;
    validate_non_negative(inputs.expiry, "expiry")?;
    validate_finite(inputs.rate, "rate")?;
    validate_finite(inputs.dividend_yield, "dividend_yield")?;
    validate_finite(inputs.vol, "vol")?;
    Ok(())
}

/// Quote fields the solver needs before it can attempt an inversion.
pub(crate) fn validate_quote(quote: &OptionQuote) -> crate::error::Result<()> {
    validate_positive(quote.spot, "spot")?;
    validate_positive(quote.strike, "strike")?;
    validate_non_negative(quote.expiry, "expiry")?;
    validate_non_negative(quote.price, "price")?;
    Ok(())
}
