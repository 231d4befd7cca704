//! Market conventions: moneyness, forwards, discounting and day counts.

use chrono::NaiveDate;

/// Days per year for ACT/365 year fractions.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Convert a strike to simple moneyness: m = K / S.
pub fn moneyness(strike: f64, spot: f64) -> f64 {
    strike / spot
}

/// Convert a strike to log-moneyness: k = ln(K / F).
pub fn log_moneyness(strike: f64, forward: f64) -> f64 {
    (strike / forward).ln()
}

/// Compute forward price from spot: F = S · exp((r − q) · T).
pub fn forward_price(spot: f64, rate: f64, dividend_yield: f64, expiry: f64) -> f64 {
    spot * ((rate - dividend_yield) * expiry).exp()
}

/// Continuous discount factor exp(−r · T).
pub fn discount_factor(rate: f64, expiry: f64) -> f64 {
    (-rate * expiry).exp()
}

/// ACT/365 year fraction between two dates. Negative when `end` precedes `start`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use ivsurf::conventions::year_fraction;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// assert!((year_fraction(start, end) - 91.0 / 365.0).abs() < 1e-12);
/// ```
pub fn year_fraction(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}
