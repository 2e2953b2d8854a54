//! Change in Six-Month Momentum Provider
//!
//! Mean daily return over the most recent `days / 2` rows minus the mean over
//! the `days / 2` rows before them.

use crate::error::Result;
use crate::frame::{RETURNS, window};
use crate::provider::{FeatureProvider, ProviderContext, check_days, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{ChMom6mConfig, ProviderSpec};
use hobart_data::SYMBOL;
use polars::prelude::*;
use std::sync::Arc;

/// Momentum acceleration.
#[derive(Debug)]
pub struct ChMom6mProvider {
    ctx: Arc<ProviderContext>,
    config: ChMom6mConfig,
}

impl ChMom6mProvider {
    /// Build a momentum change provider.
    pub fn new(ctx: Arc<ProviderContext>, config: ChMom6mConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &ChMom6mConfig) -> Result<()> {
        check_days(ProviderKind::ChMom6m, config.days, 2)
    }
}

impl FeatureProvider for ChMom6mProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ChMom6m
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: ChMom6mConfig = config_for(spec, Self::check)?;
        let half = config.days / 2;

        let recent = col(RETURNS)
            .rolling_mean(window(half))
            .over([col(SYMBOL)]);
        let earlier = col(RETURNS)
            .rolling_mean(window(half))
            .shift(lit(half as i64))
            .over([col(SYMBOL)]);

        let frame = self
            .ctx
            .daily_returns(1.0)?
            .with_column((recent - earlier).alias(self.name()));
        finish(frame, &self.columns_for(spec)?)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new().with("days", ParamRange::Int { low: 100, high: 150 })
    }
}
