//! Error types for feature providers.

use crate::registry::ProviderKind;
use hobart_data::DataError;
use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors raised while building or evaluating feature providers.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Provider name not present in the registry
    #[error("Unknown feature provider: {0}")]
    UnknownProvider(String),

    /// A provider was handed the configuration of another provider
    #[error("Provider {expected} received a {actual} configuration")]
    SpecMismatch {
        /// Kind of the provider
        expected: ProviderKind,
        /// Kind of the configuration that was passed
        actual: ProviderKind,
    },

    /// Invalid provider parameter
    #[error("Invalid parameter for {provider}: {reason}")]
    InvalidParameter {
        /// Provider the parameter belongs to
        provider: ProviderKind,
        /// What is wrong with it
        reason: String,
    },

    /// Quote data error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
