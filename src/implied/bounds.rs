//! No-arbitrage price bounds checked before any inversion is attempted.

use crate::conventions::discount_factor;
use crate::types::{OptionQuote, OptionType};

/// Price interval `[lower, upper]` a quote must fall in to be invertible.
///
/// - Calls: `[max(S − K, 0), S]`
/// - Puts: `[max(K − S, 0), K·e^(−rT)]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    /// Intrinsic value.
    pub lower: f64,
    /// Largest price any volatility could justify.
    pub upper: f64,
}

impl PriceBounds {
    /// Whether `price` lies inside the closed interval.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }
}

/// No-arbitrage bounds for a quote at the given risk-free rate.
///
/// The lower bound is undiscounted intrinsic value. A European option can
/// legitimately trade below it: a deep in-the-money put when `K·(1 − e^(−rT))`
/// outweighs its time value, or a deep in-the-money call on a dividend payer.
/// Such quotes fall outside these bounds and are reported as arbitrage rather
/// than inverted.
///
/// # Examples
/// ```
/// use ivsurf::implied::no_arbitrage_bounds;
/// use ivsurf::types::{OptionQuote, OptionType};
///
/// let deep_itm = OptionQuote::new(50.0, 1.0, OptionType::Call, 0.01, 100, 100.0);
/// let bounds = no_arbitrage_bounds(&deep_itm, 0.05);
/// assert_eq!(bounds.lower, 50.0);
/// assert!(!bounds.contains(deep_itm.price));
/// ```
pub fn no_arbitrage_bounds(quote: &OptionQuote, rate: f64) -> PriceBounds {
    let lower = quote.intrinsic();
    let upper = match quote.option_type {
        OptionType::Call => quote.spot,
        OptionType::Put => quote.strike * discount_factor(rate, quote.expiry),
    };
    PriceBounds { lower, upper }
}
