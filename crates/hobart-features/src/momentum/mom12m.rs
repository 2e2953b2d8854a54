//! Twelve-Month Momentum Provider
//!
//! Splits the trailing `days` rows into `periods` equal sub-windows of
//! `days / periods` rows and emits the mean daily return of each one.
//! `Mom12m_0` is the most recent sub-window.

use crate::error::Result;
use crate::frame::{RETURNS, window};
use crate::provider::{
    FeatureProvider, ProviderContext, check_days, check_periods, config_for, finish,
    periodic_names,
};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{Mom12mConfig, ProviderSpec};
use hobart_data::SYMBOL;
use polars::prelude::*;
use std::sync::Arc;

/// Sub-window momentum over the trailing year.
#[derive(Debug)]
pub struct Mom12mProvider {
    ctx: Arc<ProviderContext>,
    config: Mom12mConfig,
}

impl Mom12mProvider {
    /// Build a twelve-month momentum provider.
    pub fn new(ctx: Arc<ProviderContext>, config: Mom12mConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &Mom12mConfig) -> Result<()> {
        check_days(ProviderKind::Mom12m, config.days, 1)?;
        check_periods(ProviderKind::Mom12m, config.days, config.periods)
    }
}

impl FeatureProvider for Mom12mProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mom12m
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        let config: Mom12mConfig = config_for(spec, Self::check)?;
        Ok(periodic_names(self.kind(), config.periods))
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: Mom12mConfig = config_for(spec, Self::check)?;
        let columns = self.columns_for(spec)?;
        let step = config.days / config.periods;

        let exprs: Vec<Expr> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                col(RETURNS)
                    .rolling_mean(window(step))
                    .shift(lit((i * step) as i64))
                    .over([col(SYMBOL)])
                    .alias(name.as_str())
            })
            .collect();

        let frame = self.ctx.daily_returns(1.0)?.with_columns(exprs);
        finish(frame, &columns)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new()
            .with("days", ParamRange::Int { low: 200, high: 300 })
            .with("periods", ParamRange::Int { low: 1, high: 3 })
    }
}
