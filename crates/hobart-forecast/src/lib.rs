#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod example_set;
pub mod forecast;
pub mod tuner;

pub use cache::{ForecastCache, validate_cache};
pub use config::{ExampleSetConfig, ForecastConfig, ForecastParams, ToleranceConfig};
pub use engine::{CovarianceForecast, ForecastEngine};
pub use error::{ForecastError, Result};
pub use example_set::{ExampleFrame, ExampleSet, LABEL, SCALE, TEST_LABEL};
pub use forecast::{Forecast, ModelDiagnostics};
pub use tuner::{HoldoutTuner, ModelTuner, TunedModel};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
