use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ivsurf::analytics::compute_stats;
use ivsurf::config::{AnalyticsConfig, SurfaceConfig};
use ivsurf::pricing::price;
use ivsurf::surface::build_surface;
use ivsurf::{ModelInputs, OptionQuote, OptionType};

const SPOT: f64 = 100.0;

/// Synthetic chain: OTM puts below spot, calls above, skewed smile.
fn generate_quotes(cfg: &SurfaceConfig, n_expiries: usize, n_strikes: usize) -> Vec<OptionQuote> {
    let (k_min, k_max) = (SPOT * 0.8, SPOT * 1.2);
    let mut quotes = Vec::with_capacity(n_expiries * n_strikes);
    for e in 1..=n_expiries {
        let t = e as f64 * 30.0 / 365.0;
        for i in 0..n_strikes {
            let strike = k_min + (k_max - k_min) * (i as f64 / (n_strikes - 1) as f64);
            let m = (strike / SPOT).ln();
            let vol = 0.20 + 0.3 * m * m - 0.1 * m;
            let ot = if strike < SPOT {
                OptionType::Put
            } else {
                OptionType::Call
            };
            let inputs = ModelInputs {
                spot: SPOT,
                strike,
                expiry: t,
                rate: cfg.rate,
                dividend_yield: cfg.dividend_yield,
                vol,
            };
            let p = price(&inputs, ot).expect("benchmark inputs should price");
            quotes.push(OptionQuote::new(strike, t, ot, p, 100, SPOT));
        }
    }
    quotes
}

fn build_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_build");
    let cfg = SurfaceConfig::default();

    // 4×50 is the typical single-ticker snapshot; 12×100 a full listing.
    for (n_expiries, n_strikes) in [(4, 50), (12, 100)] {
        let quotes = generate_quotes(&cfg, n_expiries, n_strikes);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_expiries}x{n_strikes}")),
            &quotes,
            |b, quotes| {
                b.iter(|| build_surface(black_box(quotes), SPOT, &cfg).unwrap());
            },
        );
    }

    group.finish();
}

fn analytics_benchmarks(c: &mut Criterion) {
    let cfg = SurfaceConfig::default();
    let grid = build_surface(&generate_quotes(&cfg, 12, 100), SPOT, &cfg)
        .expect("benchmark surface should build")
        .grid;
    let analytics = AnalyticsConfig::default();

    c.bench_function("compute_stats_12x100", |b| {
        b.iter(|| compute_stats(black_box(&grid), &analytics).unwrap());
    });
}

criterion_group!(benches, build_benchmarks, analytics_benchmarks);
criterion_main!(benches);
