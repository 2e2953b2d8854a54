//! The feature provider capability and its shared context.

use crate::dividend::DivYieldProvider;
use crate::error::{FeatureError, Result};
use crate::frame::RETURNS;
use crate::label::LabelProvider;
use crate::momentum::{ChMom6mProvider, Mom1mProvider, Mom12mProvider, RetMaxProvider};
use crate::registry::ProviderKind;
use crate::scaler::ScalerProvider;
use crate::space::ParamSpace;
use crate::spec::{ProviderConfig, ProviderSpec};
use crate::ticker::TickerProvider;
use chrono::NaiveDate;
use hobart_data::{CLOSE, DATE, DIVIDENDS, QuoteSource, SYMBOL};
use polars::prelude::*;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Inputs shared by every provider of one example set.
///
/// Quotes are loaded from the source at most once.
#[derive(Debug)]
pub struct ProviderContext {
    securities: Arc<[String]>,
    date: NaiveDate,
    source: Arc<dyn QuoteSource>,
    quotes: OnceLock<DataFrame>,
}

impl ProviderContext {
    /// Create a context for `securities` with data up to `date`.
    pub fn new(
        securities: impl Into<Arc<[String]>>,
        date: NaiveDate,
        source: Arc<dyn QuoteSource>,
    ) -> Self {
        Self {
            securities: securities.into(),
            date,
            source,
            quotes: OnceLock::new(),
        }
    }

    /// Requested securities, in order.
    pub fn securities(&self) -> &[String] {
        &self.securities
    }

    /// As-of date.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Position of a security in the requested tuple.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.securities.iter().position(|s| s == symbol)
    }

    /// Quotes of every security up to the as-of date.
    pub fn quotes(&self) -> Result<&DataFrame> {
        if let Some(quotes) = self.quotes.get() {
            return Ok(quotes);
        }
        let quotes = self.source.quotes(&self.securities, self.date)?;
        debug!(rows = quotes.height(), date = %self.date, "loaded quotes");
        Ok(self.quotes.get_or_init(|| quotes))
    }

    /// Quotes with a daily total return column, sorted by symbol and date.
    ///
    /// `r_t = (close_t + div_share * dividends_t) / close_{t-1} - 1`, computed
    /// within each security. The first row of every security has no return.
    pub fn daily_returns(&self, div_share: f64) -> Result<LazyFrame> {
        let returns = self
            .quotes()?
            .clone()
            .lazy()
            .sort([SYMBOL, DATE], Default::default())
            .with_column(
                ((col(CLOSE) + lit(div_share) * col(DIVIDENDS))
                    / col(CLOSE).shift(lit(1)).over([col(SYMBOL)])
                    - lit(1.0))
                .alias(RETURNS),
            );
        Ok(returns)
    }
}

/// A source of one or more feature columns keyed by `(date, symbol)`.
///
/// A provider is built from one [`ProviderSpec`] but can be evaluated under
/// any other configuration of the same kind, which is how candidate
/// parameters are scored without rebuilding the example set.
pub trait FeatureProvider: Send + Sync + fmt::Debug {
    /// Provider kind.
    fn kind(&self) -> ProviderKind;

    /// Stable provider name.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Configuration the provider was built with.
    fn spec(&self) -> ProviderSpec;

    /// Output column names under `spec`.
    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>>;

    /// Output column names under the construction configuration.
    fn col_names(&self) -> Vec<String> {
        self.columns_for(&self.spec()).unwrap_or_default()
    }

    /// Frame with `date`, `symbol` and the output columns under `spec`.
    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame>;

    /// Categorical flag of every output column under `spec`.
    fn is_categorical(&self, spec: &ProviderSpec) -> Result<Vec<bool>> {
        Ok(vec![false; self.columns_for(spec)?.len()])
    }

    /// Search space of the provider parameters.
    fn params_space(&self) -> ParamSpace;
}

/// Build the provider for `spec`.
pub fn build_provider(
    spec: &ProviderSpec,
    ctx: Arc<ProviderContext>,
) -> Result<Box<dyn FeatureProvider>> {
    let provider: Box<dyn FeatureProvider> = match spec {
        ProviderSpec::Label(config) => Box::new(LabelProvider::new(ctx, *config)?),
        ProviderSpec::Scaler(config) => Box::new(ScalerProvider::new(ctx, *config)?),
        ProviderSpec::Ticker(config) => Box::new(TickerProvider::new(ctx, *config)),
        ProviderSpec::Mom12m(config) => Box::new(Mom12mProvider::new(ctx, *config)?),
        ProviderSpec::Mom1m(config) => Box::new(Mom1mProvider::new(ctx, *config)?),
        ProviderSpec::DivYield(config) => Box::new(DivYieldProvider::new(ctx, *config)?),
        ProviderSpec::RetMax(config) => Box::new(RetMaxProvider::new(ctx, *config)?),
        ProviderSpec::ChMom6m(config) => Box::new(ChMom6mProvider::new(ctx, *config)?),
    };
    Ok(provider)
}

/// Configuration of kind `C` from `spec`, validated by `check`.
pub(crate) fn config_for<C: ProviderConfig + Copy>(
    spec: &ProviderSpec,
    check: impl Fn(&C) -> Result<()>,
) -> Result<C> {
    let config = *C::expect_from(spec)?;
    check(&config)?;
    Ok(config)
}

/// Reject a window shorter than `min`.
pub(crate) fn check_days(kind: ProviderKind, days: usize, min: usize) -> Result<()> {
    if days < min {
        return Err(FeatureError::InvalidParameter {
            provider: kind,
            reason: format!("days must be at least {min}, got {days}"),
        });
    }
    Ok(())
}

/// Reject a sub-window split that leaves empty sub-windows.
pub(crate) fn check_periods(kind: ProviderKind, days: usize, periods: usize) -> Result<()> {
    if periods == 0 || periods > days {
        return Err(FeatureError::InvalidParameter {
            provider: kind,
            reason: format!("periods must be in 1..={days}, got {periods}"),
        });
    }
    Ok(())
}

/// `name_{i}` for every sub-window.
pub(crate) fn periodic_names(kind: ProviderKind, periods: usize) -> Vec<String> {
    (0..periods).map(|i| format!("{}_{i}", kind.name())).collect()
}

/// Select `date`, `symbol` and `columns` and collect.
pub(crate) fn finish(frame: LazyFrame, columns: &[String]) -> Result<DataFrame> {
    let mut exprs = vec![col(DATE), col(SYMBOL)];
    exprs.extend(columns.iter().map(|c| col(c.as_str())));
    Ok(frame.select(exprs).collect()?)
}
