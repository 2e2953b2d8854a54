//! Forecast five securities from three years of synthetic quotes.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p hobart --example forecast
//! ```

use chrono::{Datelike, Days, NaiveDate, Weekday};
use hobart::{
    ForecastCache, ForecastConfig, ForecastEngine, ForecastParams, InMemoryQuotes, Quote,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SYMBOLS: [&str; 5] = ["AKRN", "CHMF", "GMKN", "LSRG", "MTSS"];
const TRADING_DAYS: usize = 780;

fn weekdays(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(count)
        .collect()
}

fn synthetic_quotes(days: &[NaiveDate], seed: u64) -> InMemoryQuotes {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut quotes = InMemoryQuotes::new();

    for (i, symbol) in SYMBOLS.iter().enumerate() {
        let mut close = 100.0;
        let history: Vec<Quote> = days
            .iter()
            .enumerate()
            .map(|(t, day)| {
                if t > 0 {
                    let shock: f64 = rng.gen_range(-1.0..1.0);
                    close *= 1.0 + 0.0003 * (i as f64 + 1.0) + 0.02 * shock;
                }
                let dividends = if t % 126 == 125 { 0.02 * close } else { 0.0 };
                Quote::new(*day, close).with_dividends(dividends)
            })
            .collect();
        quotes = quotes.with_symbol(*symbol, history);
    }
    quotes
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let start = NaiveDate::from_ymd_opt(2021, 1, 4).ok_or("invalid start date")?;
    let days = weekdays(start, TRADING_DAYS);
    let date = *days.last().ok_or("no trading days")?;
    let securities: Vec<String> = SYMBOLS.iter().map(|s| s.to_string()).collect();

    let engine = ForecastEngine::new(
        Arc::new(synthetic_quotes(&days, 7)),
        ForecastConfig::default(),
    )?;
    let params = ForecastParams::default();
    let cache = ForecastCache::new();

    let forecast = engine.cached_forecast(&cache, &securities, date, &params)?;
    info!(%date, "forecast computed");

    println!("{:<6} {:>10} {:>10}", "ticker", "mean", "vol");
    for (security, (mean, vol)) in forecast
        .securities
        .iter()
        .zip(forecast.mean.iter().zip(forecast.volatility()))
    {
        println!("{security:<6} {mean:>10.4} {vol:>10.4}");
    }

    let diagnostics = &forecast.diagnostics;
    println!();
    println!(
        "cases {}  features {}  r {:.4}  r_rang {:.4}  t {:.2}",
        diagnostics.num_cases,
        diagnostics.num_features,
        diagnostics.r,
        diagnostics.r_rang,
        diagnostics.t
    );
    println!(
        "average correlation {:.4}  shrinkage {:.4}",
        forecast.average_cor, forecast.shrinkage
    );
    for (feature, importance) in &diagnostics.feature_importance {
        println!("  {feature:<12} {importance:>6.2}");
    }

    let again = engine.cached_forecast(&cache, &securities, date, &params)?;
    info!(reused = Arc::ptr_eq(&forecast, &again), "second request");
    Ok(())
}
