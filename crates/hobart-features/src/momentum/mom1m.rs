//! One-Month Momentum Provider
//!
//! Mean daily return over the trailing `days` rows.

use crate::error::Result;
use crate::frame::{RETURNS, window};
use crate::provider::{FeatureProvider, ProviderContext, check_days, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{Mom1mConfig, ProviderSpec};
use hobart_data::SYMBOL;
use polars::prelude::*;
use std::sync::Arc;

/// Short-term momentum.
#[derive(Debug)]
pub struct Mom1mProvider {
    ctx: Arc<ProviderContext>,
    config: Mom1mConfig,
}

impl Mom1mProvider {
    /// Build a one-month momentum provider.
    pub fn new(ctx: Arc<ProviderContext>, config: Mom1mConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &Mom1mConfig) -> Result<()> {
        check_days(ProviderKind::Mom1m, config.days, 1)
    }
}

impl FeatureProvider for Mom1mProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mom1m
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: Mom1mConfig = config_for(spec, Self::check)?;
        let frame = self.ctx.daily_returns(1.0)?.with_column(
            col(RETURNS)
                .rolling_mean(window(config.days))
                .over([col(SYMBOL)])
                .alias(self.name()),
        );
        finish(frame, &self.columns_for(spec)?)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new().with("days", ParamRange::Int { low: 15, high: 30 })
    }
}
