//! Synthetic market data shared by the integration tests.

#![allow(dead_code)]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use hobart_data::{InMemoryQuotes, Quote, QuoteSource};
use hobart_features::{
    ChMom6mConfig, DivYieldConfig, LabelConfig, Mom1mConfig, Mom12mConfig, ProviderSpec,
    RetMaxConfig, ScalerConfig, TickerConfig,
};
use hobart_forecast::ForecastParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub const SYMBOLS: [&str; 5] = ["AKRN", "CHMF", "GMKN", "LSRG", "MTSS"];
pub const TRADING_DAYS: usize = 300;

/// First `count` weekdays from 2022-01-03.
pub fn business_days(count: usize) -> Vec<NaiveDate> {
    let mut day = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut days = Vec::with_capacity(count);
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day = day + Days::new(1);
    }
    days
}

/// One-factor random walks with a per-security drift and quarterly dividends
/// on every other security.
pub fn synthetic_quotes(seed: u64) -> InMemoryQuotes {
    let mut rng = StdRng::seed_from_u64(seed);
    let days = business_days(TRADING_DAYS);
    let mut closes = vec![100.0_f64; SYMBOLS.len()];
    let mut histories: Vec<Vec<Quote>> = vec![Vec::with_capacity(TRADING_DAYS); SYMBOLS.len()];

    for (t, day) in days.iter().enumerate() {
        let factor: f64 = rng.gen_range(-1.0..1.0);
        for (i, history) in histories.iter_mut().enumerate() {
            if t > 0 {
                let idio: f64 = rng.gen_range(-1.0..1.0);
                let drift = 0.0002 * (i as f64 + 1.0);
                closes[i] *= 1.0 + drift + 0.012 * factor + 0.015 * idio;
            }
            let dividends = if i % 2 == 0 && t % 63 == 62 {
                0.01 * closes[i]
            } else {
                0.0
            };
            history.push(Quote::new(*day, closes[i]).with_dividends(dividends));
        }
    }

    SYMBOLS
        .iter()
        .zip(histories)
        .fold(InMemoryQuotes::new(), |quotes, (symbol, history)| {
            quotes.with_symbol(*symbol, history)
        })
}

pub fn source(seed: u64) -> Arc<dyn QuoteSource> {
    Arc::new(synthetic_quotes(seed))
}

pub fn securities() -> Vec<String> {
    SYMBOLS.iter().map(|s| s.to_string()).collect()
}

/// Last generated trading day.
pub fn as_of() -> NaiveDate {
    business_days(TRADING_DAYS)[TRADING_DAYS - 1]
}

/// Short windows that fit the synthetic history.
pub fn specs() -> Vec<ProviderSpec> {
    vec![
        LabelConfig::default().with_days(5).into(),
        ScalerConfig { days: 20 }.into(),
        TickerConfig {}.into(),
        Mom12mConfig {
            days: 60,
            periods: 2,
        }
        .into(),
        Mom1mConfig { days: 10 }.into(),
        DivYieldConfig {
            days: 60,
            periods: 1,
        }
        .into(),
        RetMaxConfig { days: 10 }.into(),
        ChMom6mConfig { days: 40 }.into(),
    ]
}

pub fn params() -> ForecastParams {
    ForecastParams {
        data: specs(),
        ..Default::default()
    }
}
