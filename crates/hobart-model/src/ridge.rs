//! Weighted ridge regression.
//!
//! Minimizes `Σ w_i (y_i - b - x_i β)² + λ ‖β‖²` over the encoded features,
//! with weights normalized to mean one so that `λ` does not depend on the
//! scale of the pool. The intercept `b` is not penalized.

use crate::error::{ModelError, Result};
use crate::pool::Pool;
use crate::regressor::{ModelParams, Regressor};
use hobart_risk::covariance::condition_number;
use hobart_risk::cholesky_solve;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

const MIN_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Encoding {
    /// `(x - mean) / std`
    Numeric { mean: f64, std: f64 },
    /// Indicator of one categorical level
    Level(f64),
}

#[derive(Debug, Clone)]
struct Column {
    feature: usize,
    encoding: Encoding,
    /// Standard deviation of the encoded column on the training pool
    spread: f64,
}

impl Column {
    fn encode(&self, value: f64) -> f64 {
        match self.encoding {
            Encoding::Numeric { mean, std } => (value - mean) / std,
            Encoding::Level(level) => f64::from(u8::from(value == level)),
        }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    num_features: usize,
    columns: Vec<Column>,
    coef: Array1<f64>,
    intercept: f64,
}

/// Ridge regression over standardized numeric and one-hot categorical
/// features.
///
/// Categorical levels not seen in training map to the dropped first level.
/// Numeric features that are constant in training carry no coefficient.
#[derive(Debug, Clone)]
pub struct RidgeRegressor {
    params: ModelParams,
    fitted: Option<Fitted>,
}

impl RidgeRegressor {
    /// Create an unfitted model.
    pub fn new(params: ModelParams) -> Result<Self> {
        if !params.l2_reg.is_finite() || params.l2_reg < 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "l2_reg must be non-negative, got {}",
                params.l2_reg
            )));
        }
        Ok(Self {
            params,
            fitted: None,
        })
    }

    /// Hyperparameters.
    pub const fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Whether `fit` has succeeded.
    pub const fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Intercept of the fitted model.
    pub fn intercept(&self) -> Result<f64> {
        Ok(self.fitted()?.intercept)
    }

    fn fitted(&self) -> Result<&Fitted> {
        self.fitted.as_ref().ok_or(ModelError::NotFitted)
    }

    fn columns(&self, pool: &Pool) -> Vec<Column> {
        let data = pool.data();
        let mut columns = Vec::new();

        for feature in 0..pool.num_features() {
            if self.params.ignored_features.contains(&feature) {
                continue;
            }
            let values = data.column(feature);

            if pool.is_categorical(feature) {
                let mut levels = values.to_vec();
                levels.sort_by(f64::total_cmp);
                levels.dedup();
                for level in levels.into_iter().skip(1) {
                    let share = values.iter().filter(|&&v| v == level).count() as f64
                        / values.len() as f64;
                    columns.push(Column {
                        feature,
                        encoding: Encoding::Level(level),
                        spread: (share * (1.0 - share)).sqrt(),
                    });
                }
            } else {
                let mean = values.mean().unwrap_or(0.0);
                let std = values.std(0.0);
                if std > 0.0 {
                    columns.push(Column {
                        feature,
                        encoding: Encoding::Numeric { mean, std },
                        spread: 1.0,
                    });
                }
            }
        }
        columns
    }

    fn check_ignored(&self, num_features: usize) -> Result<()> {
        match self
            .params
            .ignored_features
            .iter()
            .find(|&&pos| pos >= num_features)
        {
            Some(pos) => Err(ModelError::InvalidParameter(format!(
                "ignored feature {pos} outside {num_features} features"
            ))),
            None => Ok(()),
        }
    }
}

fn encode(data: &Array2<f64>, columns: &[Column]) -> Array2<f64> {
    Array2::from_shape_fn((data.nrows(), columns.len()), |(i, k)| {
        let column = &columns[k];
        column.encode(data[[i, column.feature]])
    })
}

fn check_finite(what: &str, values: ArrayView1<'_, f64>) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(ModelError::InvalidParameter(format!(
            "{what} of row {row} is not finite"
        ))),
        None => Ok(()),
    }
}

fn check_finite_rows(data: &Array2<f64>) -> Result<()> {
    for (row, values) in data.axis_iter(Axis(0)).enumerate() {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidParameter(format!(
                "features of row {row} are not finite"
            )));
        }
    }
    Ok(())
}

impl Regressor for RidgeRegressor {
    fn fit(&mut self, pool: &Pool) -> Result<()> {
        let label = pool
            .label()
            .ok_or_else(|| ModelError::InvalidParameter("training pool has no label".into()))?;
        if pool.len() < MIN_ROWS {
            return Err(ModelError::InsufficientData {
                required: MIN_ROWS,
                actual: pool.len(),
            });
        }
        self.check_ignored(pool.num_features())?;
        check_finite("label", label)?;
        check_finite_rows(pool.data())?;

        let columns = self.columns(pool);
        let x = encode(pool.data(), &columns);
        let weight = pool.weight();
        let w = &weight / weight.mean().unwrap_or(1.0);

        let (x_mean, y_mean) = if self.params.fit_intercept {
            let total = w.sum();
            let x_mean = w.dot(&x) / total;
            let y_mean = w.dot(&label) / total;
            (x_mean, y_mean)
        } else {
            (Array1::zeros(columns.len()), 0.0)
        };

        let xc = &x - &x_mean;
        let yc = &label - y_mean;
        let xw = &xc * &w.view().insert_axis(Axis(1));

        let coef = if columns.is_empty() {
            Array1::zeros(0)
        } else {
            let mut gram = xw.t().dot(&xc);
            gram.diag_mut().mapv_inplace(|d| d + self.params.l2_reg);
            debug!(condition = condition_number(&gram), "ridge normal equations");
            let rhs = xw.t().dot(&yc);
            cholesky_solve(&gram, rhs.view())?
        };
        let intercept = y_mean - x_mean.dot(&coef);

        debug!(
            rows = pool.len(),
            columns = columns.len(),
            l2_reg = self.params.l2_reg,
            "fitted ridge regression"
        );

        self.fitted = Some(Fitted {
            num_features: pool.num_features(),
            columns,
            coef,
            intercept,
        });
        Ok(())
    }

    fn predict(&self, pool: &Pool) -> Result<Array1<f64>> {
        let fitted = self.fitted()?;
        if pool.num_features() != fitted.num_features {
            return Err(ModelError::DimensionMismatch {
                what: "features",
                expected: fitted.num_features,
                actual: pool.num_features(),
            });
        }
        check_finite_rows(pool.data())?;

        let x = encode(pool.data(), &fitted.columns);
        Ok(x.dot(&fitted.coef) + fitted.intercept)
    }

    fn feature_importances(&self) -> Result<Array1<f64>> {
        let fitted = self.fitted()?;
        let mut importance = Array1::<f64>::zeros(fitted.num_features);
        for (column, coef) in fitted.columns.iter().zip(&fitted.coef) {
            importance[column.feature] += coef.abs() * column.spread;
        }

        let total = importance.sum();
        if total > 0.0 {
            importance *= 100.0 / total;
        }
        Ok(importance)
    }
}
