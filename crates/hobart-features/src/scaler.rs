//! Scaler Provider
//!
//! Rolling sample standard deviation (ddof 1) of daily total returns. It is
//! the per-row risk scale: training weights are `1 / Scaler²` and the
//! forecast covariance is normalized to `Scaler²` on its diagonal.

use crate::error::Result;
use crate::frame::{RETURNS, window};
use crate::provider::{FeatureProvider, ProviderContext, check_days, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{ProviderSpec, ScalerConfig};
use hobart_data::SYMBOL;
use polars::prelude::*;
use std::sync::Arc;

/// Trailing volatility provider.
#[derive(Debug)]
pub struct ScalerProvider {
    ctx: Arc<ProviderContext>,
    config: ScalerConfig,
}

impl ScalerProvider {
    /// Build a scaler provider.
    pub fn new(ctx: Arc<ProviderContext>, config: ScalerConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &ScalerConfig) -> Result<()> {
        check_days(ProviderKind::Scaler, config.days, 2)
    }
}

impl FeatureProvider for ScalerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Scaler
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: ScalerConfig = config_for(spec, Self::check)?;
        let frame = self.ctx.daily_returns(1.0)?.with_column(
            col(RETURNS)
                .rolling_std(window(config.days))
                .over([col(SYMBOL)])
                .alias(self.name()),
        );
        finish(frame, &self.columns_for(spec)?)
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new().with("days", ParamRange::Int { low: 100, high: 250 })
    }
}
