//! Provider outputs on small hand-checked price histories.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use hobart_data::{InMemoryQuotes, Quote};
use hobart_features::frame::{dates, floats, symbols};
use hobart_features::{
    ChMom6mConfig, DivYieldConfig, FeatureProvider, LabelConfig, LabelProvider, Mom1mConfig,
    Mom12mConfig, ProviderContext, ProviderKind, ProviderSpec, RetMaxConfig, ScalerConfig,
    TickerConfig, build_provider,
};
use rstest::rstest;
use std::collections::HashMap;
use std::sync::Arc;

const CLOSES: [f64; 6] = [100.0, 101.0, 103.0, 102.0, 105.0, 107.0];

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(i as u64)
}

fn history(closes: &[f64], dividends: &[(usize, f64)]) -> Vec<Quote> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let paid = dividends
                .iter()
                .find(|(at, _)| *at == i)
                .map_or(0.0, |(_, amount)| *amount);
            Quote::new(day(i), close).with_dividends(paid)
        })
        .collect()
}

/// Daily returns of `CLOSES`; index 0 has no return.
fn r(i: usize) -> f64 {
    CLOSES[i] / CLOSES[i - 1] - 1.0
}

fn context(securities: &[&str], source: InMemoryQuotes) -> Arc<ProviderContext> {
    Arc::new(ProviderContext::new(
        securities.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        day(30),
        Arc::new(source),
    ))
}

fn single() -> Arc<ProviderContext> {
    context(&["AAA"], InMemoryQuotes::new().with_symbol("AAA", history(&CLOSES, &[])))
}

/// Column values keyed by `(symbol, date)`.
fn values(
    provider: &dyn FeatureProvider,
    spec: &ProviderSpec,
    column: &str,
) -> HashMap<(String, NaiveDate), f64> {
    let df = provider.get(spec).unwrap();
    let keys = symbols(&df).unwrap().into_iter().zip(dates(&df).unwrap());
    keys.zip(floats(&df, column).unwrap()).collect()
}

fn at(values: &HashMap<(String, NaiveDate), f64>, symbol: &str, i: usize) -> f64 {
    values[&(symbol.to_string(), day(i))]
}

#[test]
fn test_label_is_forward_mean() {
    let spec: ProviderSpec = LabelConfig::default().with_days(2).into();
    let provider = build_provider(&spec, single()).unwrap();
    let label = values(provider.as_ref(), &spec, "Label");

    assert_relative_eq!(at(&label, "AAA", 0), (r(1) + r(2)) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(at(&label, "AAA", 3), (r(4) + r(5)) / 2.0, epsilon = 1e-12);
    assert!(at(&label, "AAA", 4).is_nan());
    assert!(at(&label, "AAA", 5).is_nan());
}

#[test]
fn test_label_counts_dividend_share() {
    let source = InMemoryQuotes::new().with_symbol("AAA", history(&CLOSES, &[(1, 2.0)]));
    let ctx = context(&["AAA"], source);
    let spec: ProviderSpec = LabelConfig {
        days: 1,
        div_share: 0.5,
    }
    .into();
    let provider = build_provider(&spec, ctx).unwrap();
    let label = values(provider.as_ref(), &spec, "Label");

    assert_relative_eq!(at(&label, "AAA", 0), (101.0 + 1.0) / 100.0 - 1.0, epsilon = 1e-12);
}

#[test]
fn test_periodic_momentum_windows() {
    let spec: ProviderSpec = Mom12mConfig { days: 4, periods: 2 }.into();
    let provider = build_provider(&spec, single()).unwrap();
    assert_eq!(provider.col_names(), vec!["Mom12m_0", "Mom12m_1"]);

    let recent = values(provider.as_ref(), &spec, "Mom12m_0");
    let earlier = values(provider.as_ref(), &spec, "Mom12m_1");

    assert_relative_eq!(at(&recent, "AAA", 5), (r(4) + r(5)) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(at(&earlier, "AAA", 5), (r(2) + r(3)) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(at(&earlier, "AAA", 4), (r(1) + r(2)) / 2.0, epsilon = 1e-12);
    assert!(at(&earlier, "AAA", 3).is_nan());
}

#[test]
fn test_short_term_statistics() {
    let ctx = single();

    let spec: ProviderSpec = Mom1mConfig { days: 3 }.into();
    let mom = values(build_provider(&spec, ctx.clone()).unwrap().as_ref(), &spec, "Mom1m");
    assert_relative_eq!(at(&mom, "AAA", 5), (r(3) + r(4) + r(5)) / 3.0, epsilon = 1e-12);

    let spec: ProviderSpec = RetMaxConfig { days: 3 }.into();
    let max = values(build_provider(&spec, ctx.clone()).unwrap().as_ref(), &spec, "RetMax");
    assert_relative_eq!(at(&max, "AAA", 5), r(3).max(r(4)).max(r(5)), epsilon = 1e-12);

    let spec: ProviderSpec = ChMom6mConfig { days: 4 }.into();
    let change = values(build_provider(&spec, ctx.clone()).unwrap().as_ref(), &spec, "ChMom6m");
    let expected = (r(4) + r(5)) / 2.0 - (r(2) + r(3)) / 2.0;
    assert_relative_eq!(at(&change, "AAA", 5), expected, epsilon = 1e-12);

    let spec: ProviderSpec = ScalerConfig { days: 2 }.into();
    let scale = values(build_provider(&spec, ctx).unwrap().as_ref(), &spec, "Scaler");
    let expected = (r(1) - r(2)).abs() / 2.0_f64.sqrt();
    assert_relative_eq!(at(&scale, "AAA", 2), expected, epsilon = 1e-12);
    assert!(at(&scale, "AAA", 1).is_nan());
}

#[test]
fn test_dividend_yield() {
    let source =
        InMemoryQuotes::new().with_symbol("AAA", history(&CLOSES, &[(3, 1.5), (4, 0.5)]));
    let spec: ProviderSpec = DivYieldConfig { days: 2, periods: 1 }.into();
    let provider = build_provider(&spec, context(&["AAA"], source)).unwrap();
    let yields = values(provider.as_ref(), &spec, "DivYield_0");

    assert_relative_eq!(at(&yields, "AAA", 4), 2.0 / 105.0, epsilon = 1e-12);
    assert_relative_eq!(at(&yields, "AAA", 5), 0.5 / 107.0, epsilon = 1e-12);
    assert_relative_eq!(at(&yields, "AAA", 2), 0.0, epsilon = 1e-12);
}

#[test]
fn test_ticker_codes_follow_tuple_order() {
    let source = InMemoryQuotes::new()
        .with_symbol("AAA", history(&CLOSES, &[]))
        .with_symbol("BBB", history(&CLOSES[..3], &[]));
    let ctx = context(&["BBB", "AAA"], source);
    let spec: ProviderSpec = TickerConfig {}.into();
    let provider = build_provider(&spec, ctx).unwrap();

    let codes = values(provider.as_ref(), &spec, "Ticker");
    assert_eq!(codes.len(), 9);
    assert_eq!(at(&codes, "BBB", 0), 0.0);
    assert_eq!(at(&codes, "AAA", 5), 1.0);
    assert_eq!(provider.is_categorical(&spec).unwrap(), vec![true]);
}

#[test]
fn test_candidate_spec_without_rebuild() {
    let built: ProviderSpec = Mom1mConfig { days: 2 }.into();
    let candidate: ProviderSpec = Mom1mConfig { days: 4 }.into();
    let provider = build_provider(&built, single()).unwrap();

    assert_eq!(provider.spec(), built);
    let mom = values(provider.as_ref(), &candidate, "Mom1m");
    let expected = (r(2) + r(3) + r(4) + r(5)) / 4.0;
    assert_relative_eq!(at(&mom, "AAA", 5), expected, epsilon = 1e-12);
    assert!(at(&mom, "AAA", 3).is_nan());
}

#[test]
fn test_trailing_returns_step_back_from_latest() {
    let shifted: Vec<f64> = CLOSES.iter().map(|c| c * 2.0).collect();
    let source = InMemoryQuotes::new()
        .with_symbol("AAA", history(&CLOSES, &[]))
        .with_symbol("BBB", history(&shifted, &[]));
    let ctx = context(&["AAA", "BBB"], source);
    let label = LabelProvider::new(ctx, LabelConfig::default()).unwrap();

    let trailing = label.trailing_returns(2).unwrap();
    assert_eq!(trailing.dates, vec![day(3), day(5)]);
    assert_eq!(trailing.returns.dim(), (2, 2));
    assert_relative_eq!(trailing.returns[[1, 0]], (r(4) + r(5)) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(trailing.returns[[0, 1]], (r(2) + r(3)) / 2.0, epsilon = 1e-12);
}

#[test]
fn test_unknown_security_fails() {
    let source = InMemoryQuotes::new().with_symbol("AAA", history(&CLOSES, &[]));
    let ctx = context(&["AAA", "ZZZ"], source);
    let spec: ProviderSpec = Mom1mConfig { days: 2 }.into();
    let provider = build_provider(&spec, ctx).unwrap();
    assert!(provider.get(&spec).is_err());
}

#[rstest]
#[case::label(ProviderKind::Label)]
#[case::scaler(ProviderKind::Scaler)]
#[case::ticker(ProviderKind::Ticker)]
#[case::mom12m(ProviderKind::Mom12m)]
#[case::mom1m(ProviderKind::Mom1m)]
#[case::div_yield(ProviderKind::DivYield)]
#[case::ret_max(ProviderKind::RetMax)]
#[case::ch_mom6m(ProviderKind::ChMom6m)]
fn test_default_spec_in_search_space(#[case] kind: ProviderKind) {
    let spec = ProviderSpec::default_for(kind);
    let provider = build_provider(&spec, single()).unwrap();
    assert_eq!(provider.kind(), kind);
    assert!(provider.params_space().contains(&spec));
}
