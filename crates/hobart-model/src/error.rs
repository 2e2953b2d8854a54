//! Model errors

use hobart_risk::CovarianceError;
use thiserror::Error;

/// Errors raised while fitting or applying a model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Arrays that must line up do not
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Prediction or importances requested before `fit`
    #[error("Model is not fitted")]
    NotFitted,

    /// Too few rows to fit
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Required number of rows
        required: usize,
        /// Actual number of rows
        actual: usize,
    },

    /// The normal equations could not be solved
    #[error("Linear algebra failure: {0}")]
    LinearAlgebra(#[from] CovarianceError),

    /// Invalid hyperparameter or input value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
