//! Ticker Provider
//!
//! Encodes the identity of a security as its position in the requested
//! tuple. The column is categorical: the numeric code carries no order.

use crate::error::Result;
use crate::provider::{FeatureProvider, ProviderContext, config_for, finish};
use crate::registry::ProviderKind;
use crate::space::ParamSpace;
use crate::spec::{ProviderSpec, TickerConfig};
use hobart_data::{DATE, SYMBOL};
use polars::prelude::*;
use std::sync::Arc;

/// Security identity provider.
#[derive(Debug)]
pub struct TickerProvider {
    ctx: Arc<ProviderContext>,
    config: TickerConfig,
}

impl TickerProvider {
    /// Build a ticker provider.
    pub const fn new(ctx: Arc<ProviderContext>, config: TickerConfig) -> Self {
        Self { ctx, config }
    }

    fn check(_: &TickerConfig) -> Result<()> {
        Ok(())
    }
}

impl FeatureProvider for TickerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ticker
    }

    fn spec(&self) -> ProviderSpec {
        self.config.into()
    }

    fn columns_for(&self, spec: &ProviderSpec) -> Result<Vec<String>> {
        config_for(spec, Self::check)?;
        Ok(vec![self.name().to_string()])
    }

    fn get(&self, spec: &ProviderSpec) -> Result<DataFrame> {
        config_for(spec, Self::check)?;

        let securities = self.ctx.securities().to_vec();
        let codes: Vec<f64> = (0..securities.len()).map(|i| i as f64).collect();
        let lookup = DataFrame::new(vec![
            Column::new(SYMBOL.into(), securities),
            Column::new(self.name().into(), codes),
        ])?;

        let frame = self
            .ctx
            .quotes()?
            .clone()
            .lazy()
            .select([col(DATE), col(SYMBOL)])
            .join(
                lookup.lazy(),
                [col(SYMBOL)],
                [col(SYMBOL)],
                JoinArgs::new(JoinType::Left),
            );
        finish(frame, &self.columns_for(spec)?)
    }

    fn is_categorical(&self, spec: &ProviderSpec) -> Result<Vec<bool>> {
        Ok(vec![true; self.columns_for(spec)?.len()])
    }

    fn params_space(&self) -> ParamSpace {
        ParamSpace::new()
    }
}
