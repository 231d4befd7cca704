//! Option chain snapshots as delivered by a market data source.
//!
//! A chain carries raw market fields (bid, ask, last, expiration date). The
//! core works on [`OptionQuote`]s, so [`OptionChain::to_quotes`] fixes the
//! two conventions the rest of the crate relies on:
//!
//! - price is the bid/ask mid when both sides are positive, else the last trade
//! - time to expiry is calendar days from the as-of date over 365
//!
//! Fetching is abstracted behind [`OptionChainSource`]. Network sources,
//! caching and retries belong to the implementor; the crate only ships the
//! in-memory [`StaticChainSource`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::conventions::year_fraction;
use crate::error::IvSurfError;
use crate::types::{OptionQuote, OptionType};

/// One listed contract in a chain snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainQuote {
    pub strike: f64,
    /// Expiration date, `YYYY-MM-DD` when serialized.
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub bid: f64,
    pub ask: f64,
    /// Last traded price.
    pub last: f64,
    pub volume: u64,
}

impl ChainQuote {
    /// Mid of a two-sided market, falling back to the last trade.
    pub fn mid_price(&self) -> f64 {
        if self.bid > 0.0 && self.ask > 0.0 && self.bid.is_finite() && self.ask.is_finite() {
            0.5 * (self.bid + self.ask)
        } else {
            self.last
        }
    }
}

/// A chain snapshot for one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub ticker: String,
    /// Underlying spot at `as_of`.
    pub spot: f64,
    pub as_of: DateTime<Utc>,
    pub quotes: Vec<ChainQuote>,
}

impl OptionChain {
    /// Convert every contract into an [`OptionQuote`] carrying the snapshot spot.
    ///
    /// No filtering happens here: expired contracts come out with a negative
    /// expiry and are rejected later as malformed.
    pub fn to_quotes(&self) -> Vec<OptionQuote> {
        let today = self.as_of.date_naive();
        self.quotes
            .iter()
            .map(|q| {
                OptionQuote::new(
                    q.strike,
                    year_fraction(today, q.expiration),
                    q.option_type,
                    q.mid_price(),
                    q.volume,
                    self.spot,
                )
            })
            .collect()
    }

    /// Sorted unique expiration dates.
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.quotes.iter().map(|q| q.expiration).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Read contracts from CSV with a
    /// `strike,expiration,option_type,bid,ask,last,volume` header.
    ///
    /// # Errors
    /// Returns [`IvSurfError::Csv`] on I/O or parse failures.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ivsurf::chain::OptionChain;
    ///
    /// let data = "\
    /// strike,expiration,option_type,bid,ask,last,volume
    /// 100,2024-07-19,call,4.10,4.30,4.25,120
    /// 95,2024-07-19,put,1.95,2.05,2.00,80
    /// ";
    /// let as_of = Utc.with_ymd_and_hms(2024, 6, 19, 16, 0, 0).unwrap();
    /// let chain = OptionChain::read_csv("SPY", 100.0, as_of, data.as_bytes())?;
    /// assert_eq!(chain.quotes.len(), 2);
    /// let quotes = chain.to_quotes();
    /// assert!((quotes[0].price - 4.20).abs() < 1e-12);
    /// assert!((quotes[0].expiry - 30.0 / 365.0).abs() < 1e-12);
    /// # Ok::<(), ivsurf::IvSurfError>(())
    /// ```
    pub fn read_csv<R: std::io::Read>(
        ticker: &str,
        spot: f64,
        as_of: DateTime<Utc>,
        reader: R,
    ) -> crate::error::Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let quotes = rdr
            .deserialize()
            .collect::<std::result::Result<Vec<ChainQuote>, csv::Error>>()?;
        Ok(Self {
            ticker: ticker.to_string(),
            spot,
            as_of,
            quotes,
        })
    }
}

/// Anything that can produce a chain snapshot for a ticker.
pub trait OptionChainSource {
    /// Fetch the current chain for `ticker`.
    ///
    /// # Errors
    /// Implementation defined. Sources should map a missing or empty chain to
    /// [`IvSurfError::InvalidInput`] rather than returning an empty snapshot.
    fn fetch(&self, ticker: &str) -> crate::error::Result<OptionChain>;
}

/// In-memory source keyed by ticker, for tests, replays and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticChainSource {
    chains: HashMap<String, OptionChain>,
}

impl StaticChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain under its own ticker, replacing any previous one.
    pub fn insert(&mut self, chain: OptionChain) {
        self.chains.insert(chain.ticker.clone(), chain);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_chain(mut self, chain: OptionChain) -> Self {
        self.insert(chain);
        self
    }
}

impl OptionChainSource for StaticChainSource {
    fn fetch(&self, ticker: &str) -> crate::error::Result<OptionChain> {
        self.chains
            .get(ticker)
            .cloned()
            .ok_or_else(|| IvSurfError::InvalidInput {
                message: format!("no option chain available for {ticker}"),
            })
    }
}
