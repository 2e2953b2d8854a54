//! Dividend Yield Provider
//!
//! Splits the trailing `days` rows into `periods` equal sub-windows and emits
//! the dividends paid in each one divided by the current close. `DivYield_0`
//! is the most recent sub-window.

use crate::error::Result;
use crate::frame::window;
use crate::provider::{
    FeatureProvider, ProviderContext, check_days, check_periods, config_for, finish,
    periodic_names,
};
use crate::registry::ProviderKind;
use crate::space::{ParamRange, ParamSpace};
use crate::spec::{DivYieldConfig, ProviderSpec};
use hobart_data::{CLOSE, DIVIDENDS, SYMBOL};
use polars::prelude::*;
use std::sync::Arc;

/// Trailing dividend yield.
#[derive(Debug)]
pub struct DivYieldProvider {
    ctx: Arc<ProviderContext>,
    config: DivYieldConfig,
}

impl DivYieldProvider {
    /// Build a dividend yield provider.
    pub fn new(ctx: Arc<ProviderContext>, config: DivYieldConfig) -> Result<Self> {
        Self::check(&config)?;
        Ok(Self { ctx, config })
    }

    fn check(config: &DivYieldConfig) -> Result<()> {
        check_days(ProviderKind::DivYield, config.days, 1)?;
        check_periods(ProviderKind::DivYield, config.days, config.periods)
    }
}

impl FeatureProvider for DivYieldProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DivYield
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        let config: DivYieldConfig = config_for(spec, Self::check)?;
        Ok(periodic_names(self.kind(), config.periods))
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        let config: DivYieldConfig = config_for(spec, Self::check)?;
        let columns = self.columns_for(spec)?;
        let step = config.days / config.periods;

        let exprs: Vec<Expr> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (col(DIVIDENDS)
                    .rolling_sum(window(step))
                    .shift(lit((i * step) as i64))
                    .over([col(SYMBOL)])
                    / col(CLOSE))
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
