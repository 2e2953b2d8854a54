//! Forecast errors
//!
//! Lower-level errors that describe a bad request (unknown provider, wrong
//! parameters, unknown security) surface as [`ForecastError::Configuration`];
//! too few observations for the covariance surface as
//! [`ForecastError::DataSufficiency`].

use hobart_data::DataError;
use hobart_features::FeatureError;
use hobart_model::ModelError;
use hobart_risk::CovarianceError;
use thiserror::Error;

/// Errors raised while building examples or forecasts
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request or configuration is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal invariant does not hold
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// A stage has too few usable rows
    #[error("Insufficient data for {stage}: need at least {required}, got {actual}")]
    DataSufficiency {
        /// Stage that ran short
        stage: String,
        /// Required count
        required: usize,
        /// Actual count
        actual: usize,
    },

    /// Data access error
    #[error(transparent)]
    Data(DataError),

    /// Feature computation error
    #[error(transparent)]
    Feature(FeatureError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Covariance estimation error
    #[error(transparent)]
    Covariance(CovarianceError),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Data sufficiency failure for `stage`.
    pub fn insufficient(stage: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::DataSufficiency {
            stage: stage.into(),
            required,
            actual,
        }
    }
}

impl From<DataError> for ForecastError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::UnknownItem { .. } => Self::Configuration(err.to_string()),
            other => Self::Data(other),
        }
    }
}

impl From<FeatureError> for ForecastError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::UnknownProvider(_)
            | FeatureError::SpecMismatch { .. }
            | FeatureError::InvalidParameter { .. } => Self::Configuration(err.to_string()),
            FeatureError::Data(data) => data.into(),
            other => Self::Feature(other),
        }
    }
}

impl From<CovarianceError> for ForecastError {
    fn from(err: CovarianceError) -> Self {
        match err {
            CovarianceError::InsufficientData { required, actual } => {
                Self::insufficient("covariance", required, actual)
            }
            other => Self::Covariance(other),
        }
    }
}

/// Result type for forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;
