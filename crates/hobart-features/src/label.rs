//! Label Provider
//!
//! The regression target: mean daily total return over the next `days` rows.
//! The last `days` rows of every security have no label.

use crate::error::Result;
use crate::frame::{self, RETURNS, window};
use crate::provider::{FeatureProvider, ProviderContext, check_days, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{LabelConfig, ProviderSpec};
use chrono::NaiveDate;
use hobart_data::{DATE, SYMBOL};
use ndarray::Array2;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

const TRAILING: &str = "trailing";

/// Non-overlapping backward-looking mean returns of every security.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingReturns {
    /// End date of every window, oldest first
    pub dates: Vec<NaiveDate>,
    /// One row per window, one column per security in tuple order
    pub returns: Array2<f64>,
}

/// Forward mean return provider.
#[derive(Debug)]
pub struct LabelProvider {
    ctx: Arc<ProviderContext>,
    config: LabelConfig,
}

impl LabelProvider {
    /// Build a label provider.
    pub fn new(ctx: Arc<ProviderContext>, config: LabelConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    /// Construction configuration.
    pub const fn config(&self) -> &LabelConfig {
        &self.config
    }

    fn check(config: &LabelConfig) -> Result<()> {
        check_days(ProviderKind::Label, config.days, 1)
    }

    /// Backward `days`-row mean returns ending at the as-of date.
    ///
    /// Windows do not overlap: the last one ends on the latest date every
    /// security shares, the previous one `days` shared dates earlier, and so
    /// on. Only dates where every security has a full window are used.
    pub fn trailing_returns(&self, days: usize) -> Result<TrailingReturns> {
        check_days(ProviderKind::Label, days, 1)?;

        let df = self
            .ctx
            .daily_returns(self.config.div_share)?
            .with_column(
                col(RETURNS)
                    .rolling_mean(window(days))
                    .over([col(SYMBOL)])
                    .alias(TRAILING),
            )
            .select([col(DATE), col(SYMBOL), col(TRAILING)])
            .collect()?;

        let dates = frame::dates(&df)?;
        let symbols = frame::symbols(&df)?;
        let values = frame::floats(&df, TRAILING)?;

        let securities = self.ctx.securities();
        let mut by_security: Vec<BTreeMap<NaiveDate, f64>> =
            vec![BTreeMap::new(); securities.len()];
        for ((date, symbol), value) in dates.into_iter().zip(&symbols).zip(values) {
            if let Some(pos) = self.ctx.position(symbol)
                && value.is_finite()
            {
                by_security[pos].insert(date, value);
            }
        }

        let mut common: BTreeSet<NaiveDate> = by_security
            .first()
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        for history in by_security.iter().skip(1) {
            common.retain(|d| history.contains_key(d));
        }
        let common: Vec<NaiveDate> = common.into_iter().collect();

        let mut picked: Vec<NaiveDate> = common.iter().rev().step_by(days).copied().collect();
        picked.reverse();

        let returns = Array2::from_shape_fn((picked.len(), securities.len()), |(t, i)| {
            by_security[i]
                .get(&picked[t])
                .copied()
                .unwrap_or(f64::NAN)
        });
        debug!(windows = picked.len(), days, "trailing returns");

        Ok(TrailingReturns {
            dates: picked,
            returns,
        })
    }
}

impl FeatureProvider for LabelProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Label
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: LabelConfig = config_for(spec, Self::check)?;
        let frame = self.ctx.daily_returns(config.div_share)?.with_column(
            col(RETURNS)
                .rolling_mean(window(config.days))
                .shift(lit(-(config.days as i64)))
                .over([col(SYMBOL)])
                .alias(self.name()),
        );
        finish(frame, &self.columns_for(spec)?)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new()
            .with("days", ParamRange::Int { low: 15, high: 30 })
            .with("div_share", ParamRange::Float { low: 0.0, high: 1.0 })
    }
}
