#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use hobart_data as data;
pub use hobart_features as features;
pub use hobart_forecast as forecast;
pub use hobart_model as model;
pub use hobart_risk as risk;

// Re-export the types most requests need
pub use hobart_data::{InMemoryQuotes, Quote, QuoteSource, SqliteQuoteStore};
pub use hobart_features::{ProviderKind, ProviderSpec};
pub use hobart_forecast::{
    Forecast, ForecastCache, ForecastConfig, ForecastEngine, ForecastError, ForecastParams,
    validate_cache,
};
pub use hobart_model::ModelParams;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_params_cover_every_provider() {
        let params = ForecastParams::default();
        let kinds: Vec<ProviderKind> = params.data.iter().map(ProviderSpec::kind).collect();
        assert_eq!(kinds.len(), features::available_providers().len());
        assert_eq!(kinds[0], ProviderKind::Label);
        assert_eq!(kinds[1], ProviderKind::Scaler);
    }
}
