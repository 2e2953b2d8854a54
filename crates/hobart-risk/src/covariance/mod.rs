//! Covariance estimation
//!
//! Estimators take a `T x N` panel (rows are periods, columns are securities)
//! and return an `N x N` covariance matrix.

pub mod ledoit_wolf;
pub mod utils;

pub use ledoit_wolf::{LedoitWolfConfig, LedoitWolfEstimator, ShrinkageEstimate};
pub use utils::{
    EigenDecomposition, average_correlation, cholesky, cholesky_solve, condition_number,
    is_positive_semidefinite, jacobi_eigendecomp, scale_correlation,
};

use ndarray::Array2;
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Matrix is not positive definite
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid parameter or input
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Trait for covariance matrix estimators
pub trait CovarianceEstimator {
    /// Estimate the covariance matrix of `returns`
    ///
    /// # Arguments
    /// * `returns` - Matrix where each row is a period and each column a security
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;
}
