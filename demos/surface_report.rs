//! Build an implied volatility surface from a chain snapshot and report on it.
//!
//! Demonstrates the end-to-end workflow:
//!   1. Serve a chain snapshot through an `OptionChainSource`
//!   2. Build the surface and inspect the data-quality diagnostics
//!   3. Print the expiry × strike grid with holes
//!   4. Compute ATM term structure and skew
//!   5. Export the flattened rows as CSV
//!
//! Run with: `cargo run --example surface_report`

use chrono::{Duration, TimeZone, Utc};
use ivsurf::analytics::compute_stats;
use ivsurf::chain::{ChainQuote, OptionChain, OptionChainSource, StaticChainSource};
use ivsurf::config::{AnalyticsConfig, SurfaceConfig};
use ivsurf::pricing::price;
use ivsurf::surface::SurfaceBuilder;
use ivsurf::{ModelInputs, OptionType};

/// SPX-like smile: put skew, convex wings, rising term structure.
fn market_vol(spot: f64, strike: f64, expiry: f64) -> f64 {
    let m = (strike / spot).ln();
    0.17 + 0.5 * m * m - 0.2 * m + 0.04 * expiry
}

fn synthetic_chain(cfg: &SurfaceConfig) -> Result<OptionChain, Box<dyn std::error::Error>> {
    let spot = 5_000.0;
    let as_of = Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap();
    let today = as_of.date_naive();

    let mut quotes = Vec::new();
    for days in [14_i64, 30, 60, 91, 182] {
        let expiry = days as f64 / 365.0;
        for i in 0..21 {
            let strike = 4_000.0 + 100.0 * i as f64;
            let option_type = if strike < spot {
                OptionType::Put
            } else {
                OptionType::Call
            };
            let inputs = ModelInputs {
                spot,
                strike,
                expiry,
                rate: cfg.rate,
                dividend_yield: cfg.dividend_yield,
                vol: market_vol(spot, strike, expiry),
            };
            let mid = price(&inputs, option_type)?;
            // Thin the far wings so the volume filter has something to do.
            let volume = if (i as i32 - 10).abs() > 8 { 3 } else { 250 };
            quotes.push(ChainQuote {
                strike,
                expiration: today + Duration::days(days),
                option_type,
                bid: mid * 0.98,
                ask: mid * 1.02,
                last: mid,
                volume,
            });
        }
    }

    Ok(OptionChain {
        ticker: "SPX".into(),
        spot,
        as_of,
        quotes,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ---------------------------------------------------------------
    // 1. Market data
    // ---------------------------------------------------------------

    let cfg = SurfaceConfig::default();
    let source = StaticChainSource::new().with_chain(synthetic_chain(&cfg)?);
    let chain = source.fetch("SPX")?;
    println!(
        "{}: spot {:.2}, {} contracts over {} expirations\n",
        chain.ticker,
        chain.spot,
        chain.quotes.len(),
        chain.expirations().len()
    );

    // ---------------------------------------------------------------
    // 2. Build
    // ---------------------------------------------------------------

    let build = SurfaceBuilder::new().config(cfg).chain(&chain).build()?;
    let d = &build.diagnostics;
    println!("--- Diagnostics ---");
    println!("  input quotes       {:>4}", d.input_quotes);
    println!("  excluded (volume)  {:>4}", d.excluded_by_volume);
    println!("  excluded (strike)  {:>4}", d.excluded_by_strike);
    println!("  excluded (expiry)  {:>4}", d.excluded_by_expiry);
    println!("  excluded (price)   {:>4}", d.excluded_by_price);
    println!("  converged          {:>4}", d.converged);
    println!("  failed to solve    {:>4}", d.failed_to_solve());
    println!("  surface points     {:>4}\n", d.surface_points);

    // ---------------------------------------------------------------
    // 3. Grid
    // ---------------------------------------------------------------

    let grid = &build.grid;
    print!("{:>8}", "T \\ K");
    for k in grid.strikes() {
        print!("{k:>8.0}");
    }
    println!();
    for (t, row) in grid.expiries().iter().zip(grid.matrix()) {
        print!("{:>7.0}d", t * 365.0);
        for cell in row {
            match cell {
                Some(v) => print!("{:>7.2}%", v * 100.0),
                None => print!("{:>8}", "-"),
            }
        }
        println!();
    }
    println!();

    // ---------------------------------------------------------------
    // 4. Analytics
    // ---------------------------------------------------------------

    let stats = compute_stats(grid, &AnalyticsConfig::default())?;
    println!("--- ATM term structure ---");
    for p in &stats.term_structure {
        println!("  {:>4.0}d  {:>6.2}%", p.expiry * 365.0, p.vol * 100.0);
    }
    if let Some(slope) = stats.term_structure_slope {
        println!("  slope  {:+.2} vol pts per expiry", slope * 100.0);
    }
    let s = &stats.skew;
    println!(
        "\nSkew at {:.0}d: σ({:.0}) − σ({:.0}) = {:.2} vol pts\n",
        s.expiry * 365.0,
        s.low_strike,
        s.high_strike,
        s.skew * 100.0
    );

    // ---------------------------------------------------------------
    // 5. CSV export
    // ---------------------------------------------------------------

    println!("--- CSV (first rows) ---");
    let mut buf = Vec::new();
    grid.write_csv(&mut buf)?;
    for line in String::from_utf8(buf)?.lines().take(6) {
        println!("{line}");
    }

    Ok(())
}
