#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dividend;
pub mod error;
pub mod frame;
pub mod label;
pub mod momentum;
pub mod provider;
pub mod registry;
pub mod scaler;
pub mod space;
pub mod spec;
pub mod ticker;

pub use error::{FeatureError, Result};
pub use frame::RETURNS;
pub use label::{LabelProvider, TrailingReturns};
pub use provider::{FeatureProvider, ProviderContext, build_provider};
pub use space::{ParamRange, ParamSpace};
pub use spec::{
    ChMom6mConfig, DivYieldConfig, LabelConfig, Mom1mConfig, Mom12mConfig, ProviderConfig,
    ProviderSpec, RetMaxConfig, ScalerConfig, TickerConfig,
};

// Re-export registry types for convenience
pub use registry::{
    ProviderCategory, ProviderInfo, ProviderKind, available_providers, count_by_category,
    get_provider_info, providers_by_category,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
