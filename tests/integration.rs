//! Integration tests for the ivsurf pipeline.
//!
//! Exercises the full path from a chain snapshot through quote cleaning,
//! implied volatility extraction, grid assembly, analytics and export.

use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use chrono::{Duration, TimeZone, Utc};
use ivsurf::analytics::{atm_vol, compute_stats, term_structure};
use ivsurf::chain::{ChainQuote, OptionChain, OptionChainSource, StaticChainSource};
use ivsurf::config::{AnalyticsConfig, SurfaceConfig};
use ivsurf::implied::{ImpliedVolSolver, SolverStatus};
use ivsurf::pricing::price;
use ivsurf::surface::{SurfaceBuilder, SurfaceGrid, build_surface};
use ivsurf::{IvSurfError, ModelInputs, OptionQuote, OptionType};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SPOT: f64 = 100.0;

/// Smile with put skew, mild convexity and an upward term structure.
fn market_vol(strike: f64, expiry: f64) -> f64 {
    let m = (strike / SPOT).ln();
    0.18 + 0.4 * m * m - 0.15 * m + 0.05 * expiry
}

/// OTM side: puts below spot, calls at and above.
fn otm_type(strike: f64) -> OptionType {
    if strike < SPOT {
        OptionType::Put
    } else {
        OptionType::Call
    }
}

fn model_price(strike: f64, expiry: f64, cfg: &SurfaceConfig, option_type: OptionType) -> f64 {
    let inputs = ModelInputs {
        spot: SPOT,
        strike,
        expiry,
        rate: cfg.rate,
        dividend_yield: cfg.dividend_yield,
        vol: market_vol(strike, expiry),
    };
    price(&inputs, option_type).unwrap()
}

/// 50 strikes × 4 expiries; every strike index divisible by 10 with a
/// remainder below 3 trades under the default volume threshold (30%).
fn two_hundred_quotes(cfg: &SurfaceConfig) -> (Vec<OptionQuote>, usize) {
    let expiries = [30.0 / 365.0, 60.0 / 365.0, 90.0 / 365.0, 180.0 / 365.0];
    let mut quotes = Vec::new();
    let mut thin = 0;
    for &t in &expiries {
        for i in 0..50 {
            let strike = 76.0 + i as f64;
            let volume = if i % 10 < 3 {
                thin += 1;
                5
            } else {
                250
            };
            let ot = otm_type(strike);
            quotes.push(OptionQuote::new(
                strike,
                t,
                ot,
                model_price(strike, t, cfg, ot),
                volume,
                SPOT,
            ));
        }
    }
    (quotes, thin)
}

fn chain_snapshot(cfg: &SurfaceConfig) -> OptionChain {
    let as_of = Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap();
    let today = as_of.date_naive();
    let mut quotes = Vec::new();
    for days in [30_i64, 60, 91] {
        let expiration = today + Duration::days(days);
        let t = days as f64 / 365.0;
        for strike in [85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0] {
            let ot = otm_type(strike);
            let p = model_price(strike, t, cfg, ot);
            quotes.push(ChainQuote {
                strike,
                expiration,
                option_type: ot,
                bid: 0.99 * p,
                ask: 1.01 * p,
                last: 1.2 * p,
                volume: 500,
            });
        }
    }
    OptionChain {
        ticker: "XYZ".into(),
        spot: SPOT,
        as_of,
        quotes,
    }
}

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn reference_atm_call_prices_and_inverts() {
    let inputs = ModelInputs {
        spot: 100.0,
        strike: 100.0,
        expiry: 0.5,
        rate: 0.05,
        dividend_yield: 0.0,
        vol: 0.20,
    };
    let p = price(&inputs, OptionType::Call).unwrap();
    assert_abs_diff_eq!(p, 6.8887, epsilon = 1e-4);

    let quote = OptionQuote::new(100.0, 0.5, OptionType::Call, p, 100, 100.0);
    let result = ImpliedVolSolver::default().solve(&quote, 0.05, 0.0).unwrap();
    assert_eq!(result.status, SolverStatus::Converged);
    assert_abs_diff_eq!(result.vol.unwrap().0, 0.20, epsilon = 1e-6);
}

#[test]
fn deep_itm_call_far_below_intrinsic_is_rejected() {
    let quote = OptionQuote::new(50.0, 1.0, OptionType::Call, 0.01, 100, 100.0);
    let result = ImpliedVolSolver::default().solve(&quote, 0.05, 0.0).unwrap();
    assert_eq!(result.status, SolverStatus::NoArbitrageViolation);
    assert!(result.vol.is_none());
}

#[test]
fn two_hundred_quotes_with_thin_volume() {
    let cfg = SurfaceConfig::default();
    let (quotes, thin) = two_hundred_quotes(&cfg);
    assert_eq!(quotes.len(), 200);
    assert_eq!(thin, 60);

    let build = build_surface(&quotes, SPOT, &cfg).unwrap();
    let d = &build.diagnostics;
    assert_eq!(d.input_quotes, 200);
    assert_eq!(d.excluded_by_volume, thin);
    assert!(build.grid.len() <= 140);
    assert!(build.grid.expiries().len() <= 4);
    assert_eq!(d.excluded_total() + d.solved, d.input_quotes);
    assert_eq!(
        d.converged,
        d.above_ceiling + d.merged_duplicates + d.surface_points
    );
    assert_eq!(d.surface_points, build.grid.len());

    for p in build.grid.points() {
        assert_abs_diff_eq!(p.vol, market_vol(p.strike, p.expiry), epsilon = 1e-4);
    }
}

#[test]
fn too_few_survivors_is_insufficient_data() {
    let cfg = SurfaceConfig::default();
    let (quotes, _) = two_hundred_quotes(&cfg);
    let thin: Vec<OptionQuote> = quotes.iter().copied().filter(|q| q.volume < 10).collect();
    let mut sample = thin.clone();
    // Two liquid near-the-money quotes are not a surface.
    sample.extend(
        quotes
            .iter()
            .copied()
            .filter(|q| q.volume >= 10 && (99.0..=105.0).contains(&q.strike))
            .take(2),
    );

    match build_surface(&sample, SPOT, &cfg) {
        Err(IvSurfError::InsufficientData {
            found,
            required,
            diagnostics,
        }) => {
            assert_eq!(found, 2);
            assert_eq!(required, cfg.min_points);
            assert_eq!(diagnostics.excluded_by_volume, thin.len());
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Chain → surface → analytics → export
// ---------------------------------------------------------------------------

#[test]
fn chain_source_to_stats_pipeline() {
    let cfg = SurfaceConfig::default();
    let source = StaticChainSource::new().with_chain(chain_snapshot(&cfg));
    let chain = source.fetch("XYZ").unwrap();

    let build = SurfaceBuilder::new().config(cfg).chain(&chain).build().unwrap();
    assert_eq!(build.grid.spot(), SPOT);
    assert_eq!(build.grid.expiries().len(), 3);
    assert_eq!(build.diagnostics.input_quotes, 21);

    for p in build.grid.points() {
        assert_abs_diff_eq!(p.vol, market_vol(p.strike, p.expiry), epsilon = 1e-4);
    }

    let stats = compute_stats(&build.grid, &AnalyticsConfig::default()).unwrap();
    assert_eq!(stats.term_structure.len(), 3);
    assert_abs_diff_eq!(stats.skew.expiry, 30.0 / 365.0, epsilon = 1e-12);
    assert!(stats.skew.skew > 0.0, "put skew expected");
    assert!(stats.term_structure_slope.unwrap() > 0.0);

    let atm = atm_vol(&build.grid, 60.0 / 365.0).unwrap();
    assert_abs_diff_eq!(atm.0, market_vol(SPOT, 60.0 / 365.0), epsilon = 1e-4);
}

#[test]
fn csv_export_round_trips_through_reader() {
    let cfg = SurfaceConfig::default();
    let chain = chain_snapshot(&cfg);
    let build = SurfaceBuilder::new().config(cfg).chain(&chain).build().unwrap();

    let mut buf = Vec::new();
    build.grid.write_csv(&mut buf).unwrap();
    let mut rdr = csv::Reader::from_reader(buf.as_slice());
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["strike", "expiry", "moneyness", "implied_vol"]
    );
    assert_eq!(rdr.records().count(), build.grid.len());
}

#[test]
fn config_from_json_drives_the_build() {
    let base = SurfaceConfig::default();
    let (quotes, _) = two_hundred_quotes(&base);
    let cfg: SurfaceConfig =
        serde_json::from_str(r#"{ "min_volume": 1, "min_moneyness": 0.9, "max_moneyness": 1.1 }"#)
            .unwrap();

    let build = build_surface(&quotes, SPOT, &cfg).unwrap();
    assert_eq!(build.diagnostics.excluded_by_volume, 0);
    assert!(build.diagnostics.excluded_by_strike > 0);
    assert!(build.grid.strikes().iter().all(|&k| (90.0..=110.0).contains(&k)));
}

// ---------------------------------------------------------------------------
// Determinism and thread safety
// ---------------------------------------------------------------------------

#[test]
fn surface_is_independent_of_quote_order() {
    let cfg = SurfaceConfig::default();
    let (mut quotes, _) = two_hundred_quotes(&cfg);
    // Both sides at every strike so the tie-break is exercised.
    let extra: Vec<OptionQuote> = quotes
        .iter()
        .filter(|q| q.volume >= 10)
        .map(|q| {
            let other = match q.option_type {
                OptionType::Call => OptionType::Put,
                OptionType::Put => OptionType::Call,
            };
            OptionQuote::new(
                q.strike,
                q.expiry,
                other,
                model_price(q.strike, q.expiry, &cfg, other),
                q.volume,
                SPOT,
            )
        })
        .collect();
    quotes.extend(extra);

    let forward = build_surface(&quotes, SPOT, &cfg).unwrap();
    quotes.reverse();
    let reversed = build_surface(&quotes, SPOT, &cfg).unwrap();
    assert_eq!(forward.grid, reversed.grid);
    assert!(forward.diagnostics.merged_duplicates > 0);
}

#[test]
fn grid_is_shareable_across_threads() {
    let cfg = SurfaceConfig::default();
    let (quotes, _) = two_hundred_quotes(&cfg);
    let grid: Arc<SurfaceGrid> = Arc::new(build_surface(&quotes, SPOT, &cfg).unwrap().grid);
    let expected = term_structure(&grid).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let grid = Arc::clone(&grid);
            thread::spawn(move || term_structure(&grid).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn grid_json_round_trip() {
    let cfg = SurfaceConfig::default();
    let (quotes, _) = two_hundred_quotes(&cfg);
    let build = build_surface(&quotes, SPOT, &cfg).unwrap();
    let json = serde_json::to_string(&build).unwrap();
    let back: ivsurf::SurfaceBuild = serde_json::from_str(&json).unwrap();
    assert_eq!(back.grid.len(), build.grid.len());
    assert_eq!(back.diagnostics, build.diagnostics);
}
