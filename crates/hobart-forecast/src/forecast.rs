//! Forecast values.

use crate::config::ForecastParams;
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Fit and validation statistics of the model behind a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    /// Rows in the production training pool
    pub num_cases: usize,
    /// Feature columns
    pub num_features: usize,
    /// Pearson correlation on the validation block
    pub r: f64,
    /// Spearman correlation on the validation block
    pub r_rang: f64,
    /// t-statistic of the per-date rank IC on the validation block
    pub t: f64,
    /// `(feature, importance)` pairs, importances summing to 100
    pub feature_importance: Vec<(String, f64)>,
}

/// Expected returns and covariance of a security tuple as of one date.
///
/// `mean` and `cov` follow the order of `securities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// As-of date
    pub date: NaiveDate,
    /// Securities, in request order
    pub securities: Vec<String>,
    /// Expected return per security
    pub mean: Array1<f64>,
    /// Covariance matrix
    pub cov: Array2<f64>,
    /// Model diagnostics
    pub diagnostics: ModelDiagnostics,
    /// Average off-diagonal correlation of the shrunk correlation matrix
    pub average_cor: f64,
    /// Shrinkage intensity in `[0, 1]`
    pub shrinkage: f64,
    /// Parameters the forecast was built with
    pub params: ForecastParams,
}

impl Forecast {
    /// Volatility of each security, `sqrt(diag(cov))`.
    pub fn volatility(&self) -> Array1<f64> {
        self.cov.diag().mapv(f64::sqrt)
    }

    /// Position of a security.
    pub fn position(&self, security: &str) -> Option<usize> {
        self.securities.iter().position(|s| s == security)
    }
}
