//! Maximum Return Provider
//!
//! Largest single-day return over the trailing `days` rows, a lottery-demand
//! proxy.

use crate::error::Result;
use crate::frame::{RETURNS, window};
use crate::provider::{FeatureProvider, ProviderContext, check_days, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{ProviderSpec, RetMaxConfig};
use hobart_data::SYMBOL;
use polars::prelude::*;
use std::sync::Arc;

/// Trailing maximum daily return.
#[derive(Debug)]
pub struct RetMaxProvider {
    ctx: Arc<ProviderContext>,
    config: RetMaxConfig,
}

impl RetMaxProvider {
    /// Build a maximum return provider.
    pub fn new(ctx: Arc<ProviderContext>, config: RetMaxConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &RetMaxConfig) -> Result<()> {
        check_days(ProviderKind::RetMax, config.days, 1)
    }
}

impl FeatureProvider for RetMaxProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RetMax
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: RetMaxConfig = config_for(spec, Self::check)?;
        let frame = self.ctx.daily_returns(1.0)?.with_column(
            col(RETURNS)
                .rolling_max(window(config.days))
                .over([col(SYMBOL)])
                .alias(self.name()),
        );
        finish(frame, &self.columns_for(spec)?)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new().with("days", ParamRange::Int { low: 15, high: 30 })
    }
}
