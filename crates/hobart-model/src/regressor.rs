//! The regression capability.

use crate::error::Result;
use crate::pool::Pool;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model hyperparameters.
///
/// Compared by deep equality when checking cached forecasts, so every field
/// that changes the fitted model belongs here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// L2 penalty on standardized coefficients (default: 1.0)
    pub l2_reg: f64,
    /// Feature positions left out of the fit (default: none)
    pub ignored_features: Vec<usize>,
    /// Fit an unpenalized intercept (default: true)
    pub fit_intercept: bool,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            l2_reg: 1.0,
            ignored_features: Vec::new(),
            fit_intercept: true,
        }
    }
}

/// A supervised model over [`Pool`]s.
pub trait Regressor: Send + Sync + fmt::Debug {
    /// Fit on a labeled pool, weighting rows by the pool weights.
    fn fit(&mut self, pool: &Pool) -> Result<()>;

    /// One prediction per row, in row order.
    fn predict(&self, pool: &Pool) -> Result<Array1<f64>>;

    /// Importance of every feature column, summing to 100 (or all zero).
    fn feature_importances(&self) -> Result<Array1<f64>>;
}
