//! Ledoit-Wolf Shrinkage Covariance Estimator
//!
//! Implements the analytic shrinkage estimator of "Honey, I Shrunk the Sample
//! Covariance Matrix" (Ledoit & Wolf, 2004) with the constant-correlation
//! target.
//!
//! The estimator has the form:
//! Σ_LW = δ* F + (1-δ*) S
//!
//! where:
//! - S is the sample covariance matrix (divided by T)
//! - F is the shrinkage target
//! - δ* ∈ [0, 1] is the optimal shrinkage intensity

use super::{CovarianceError, CovarianceEstimator};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Ledoit-Wolf covariance estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedoitWolfConfig {
    /// Minimum number of observations required (default: 2)
    pub min_observations: usize,

    /// Whether to subtract column means before estimation (default: true)
    pub center: bool,

    /// Fixed shrinkage intensity in `[0, 1]` used instead of the analytic one
    pub intensity: Option<f64>,
}

impl Default for LedoitWolfConfig {
    fn default() -> Self {
        Self {
            min_observations: 2,
            center: true,
            intensity: None,
        }
    }
}

/// Full output of a shrinkage estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkageEstimate {
    /// Shrunk covariance matrix δ F + (1-δ) S
    pub covariance: Array2<f64>,
    /// Sample covariance S
    pub sample: Array2<f64>,
    /// Constant-correlation target F
    pub target: Array2<f64>,
    /// Shrinkage intensity δ
    pub intensity: f64,
}

/// Ledoit-Wolf shrinkage covariance estimator
#[derive(Debug, Clone, Default)]
pub struct LedoitWolfEstimator {
    config: LedoitWolfConfig,
}

impl LedoitWolfEstimator {
    /// Create a new Ledoit-Wolf estimator with the given configuration
    pub const fn new(config: LedoitWolfConfig) -> Self {
        Self { config }
    }

    /// Estimator configuration.
    pub const fn config(&self) -> &LedoitWolfConfig {
        &self.config
    }

    /// Estimate the shrunk covariance together with its ingredients.
    pub fn shrink(&self, returns: &Array2<f64>) -> Result<ShrinkageEstimate, CovarianceError> {
        let (n_periods, n_assets) = returns.dim();

        if n_periods < self.config.min_observations.max(1) {
            return Err(CovarianceError::InsufficientData {
                required: self.config.min_observations.max(1),
                actual: n_periods,
            });
        }
        if n_assets == 0 {
            return Err(CovarianceError::InvalidParameter(
                "return panel has no columns".to_string(),
            ));
        }
        if returns.iter().any(|v| !v.is_finite()) {
            return Err(CovarianceError::InvalidParameter(
                "return panel contains non-finite values".to_string(),
            ));
        }
        if let Some(delta) = self.config.intensity
            && !(0.0..=1.0).contains(&delta)
        {
            return Err(CovarianceError::InvalidParameter(format!(
                "shrinkage intensity {delta} outside [0, 1]"
            )));
        }

        let x = self.prepare(returns)?;
        let t = n_periods as f64;
        let sample = x.t().dot(&x) / t;

        let (target, analytic) = constant_correlation(&x, &sample)?;
        let intensity = self.config.intensity.unwrap_or(analytic);
        let covariance = &target * intensity + &sample * (1.0 - intensity);

        Ok(ShrinkageEstimate {
            covariance,
            sample,
            target,
            intensity,
        })
    }

    fn prepare(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        if !self.config.center {
            return Ok(returns.clone());
        }
        let means = returns
            .mean_axis(Axis(0))
            .ok_or(CovarianceError::InsufficientData {
                required: 1,
                actual: 0,
            })?;
        Ok(returns - &means.insert_axis(Axis(0)))
    }
}

impl CovarianceEstimator for LedoitWolfEstimator {
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        self.shrink(returns).map(|estimate| estimate.covariance)
    }
}

/// Constant-correlation target and its optimal intensity.
///
/// `x` must already be in the form the sample covariance was computed from.
fn constant_correlation(
    x: &Array2<f64>,
    sample: &Array2<f64>,
) -> Result<(Array2<f64>, f64), CovarianceError> {
    let (n_periods, n) = x.dim();
    let t = n_periods as f64;

    let var: Array1<f64> = sample.diag().to_owned();
    let sqrtvar = var.mapv(f64::sqrt);
    if let Some(col) = sqrtvar.iter().position(|&s| s <= 0.0) {
        return Err(CovarianceError::InvalidParameter(format!(
            "column {col} has zero variance"
        )));
    }

    let mut r_bar = 0.0;
    if n > 1 {
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    r_bar += sample[[i, j]] / (sqrtvar[i] * sqrtvar[j]);
                }
            }
        }
        r_bar /= (n * (n - 1)) as f64;
    }

    let mut prior = Array2::from_shape_fn((n, n), |(i, j)| r_bar * sqrtvar[i] * sqrtvar[j]);
    prior.diag_mut().assign(&var);

    // π: sum of asymptotic variances of the sample covariance entries
    let x2 = x.mapv(|v| v * v);
    let phi_mat = x2.t().dot(&x2) / t - sample.mapv(|v| v * v);
    let phi = phi_mat.sum();

    // ρ: diagonal part plus the correlation-driven off-diagonal part
    let x3 = x.mapv(|v| v * v * v);
    let term1 = x3.t().dot(x) / t;
    let mut theta_mat =
        Array2::from_shape_fn((n, n), |(i, j)| term1[[i, j]] - var[i] * sample[[i, j]]);
    theta_mat.diag_mut().fill(0.0);
    let off_diag: f64 = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| sqrtvar[j] / sqrtvar[i] * theta_mat[[i, j]])
        .sum();
    let rho = phi_mat.diag().sum() + r_bar * off_diag;

    // γ: misspecification of the target
    let gamma = (sample - &prior).mapv(|v| v * v).sum();

    let intensity = if gamma > 0.0 {
        ((phi - rho) / gamma / t).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok((prior, intensity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn panel() -> Array2<f64> {
        Array2::from_shape_vec(
            (10, 3),
            vec![
                0.01, 0.02, -0.01, -0.01, 0.01, 0.02, 0.02, -0.01, 0.01, -0.02, 0.01, -0.01, 0.01,
                -0.02, 0.02, 0.02, 0.01, -0.02, -0.01, -0.01, 0.01, 0.01, 0.02, 0.01, -0.02, -0.01,
                -0.01, 0.01, 0.01, 0.02,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ledoit_wolf_config_default() {
        let config = LedoitWolfConfig::default();
        assert_eq!(config.min_observations, 2);
        assert!(config.center);
        assert_eq!(config.intensity, None);
    }

    #[test]
    fn test_insufficient_data() {
        let estimator = LedoitWolfEstimator::default();
        let returns = Array2::<f64>::zeros((1, 3));
        assert!(matches!(
            estimator.estimate(&returns),
            Err(CovarianceError::InsufficientData {
                required: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let mut returns = panel();
        returns[[3, 1]] = f64::NAN;
        let estimator = LedoitWolfEstimator::default();
        assert!(matches!(
            estimator.estimate(&returns),
            Err(CovarianceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sample_covariance_uncentered() {
        let config = LedoitWolfConfig {
            center: false,
            ..Default::default()
        };
        let estimator = LedoitWolfEstimator::new(config);
        let returns = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 2.0, 5.0, 3.0, 5.0]).unwrap();

        let estimate = estimator.shrink(&returns).unwrap();

        // (1/3) * X'X = (1/3) * [[14, 27], [27, 54]]
        assert_relative_eq!(estimate.sample[[0, 0]], 14.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.sample[[0, 1]], 27.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.sample[[1, 1]], 54.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_correlation_target() {
        let estimator = LedoitWolfEstimator::default();
        let estimate = estimator.shrink(&panel()).unwrap();
        let sample = &estimate.sample;
        let target = &estimate.target;

        let sd = sample.diag().mapv(f64::sqrt);
        let corr = |i: usize, j: usize| sample[[i, j]] / (sd[i] * sd[j]);
        let r_bar = (corr(0, 1) + corr(0, 2) + corr(1, 2)) / 3.0;

        for i in 0..3 {
            assert_relative_eq!(target[[i, i]], sample[[i, i]], epsilon = 1e-14);
        }
        assert_relative_eq!(target[[0, 2]], r_bar * sd[0] * sd[2], epsilon = 1e-14);
        assert_relative_eq!(target[[2, 1]], r_bar * sd[2] * sd[1], epsilon = 1e-14);
    }

    #[test]
    fn test_shrinkage_is_convex_combination() {
        let estimate = LedoitWolfEstimator::default().shrink(&panel()).unwrap();
        let delta = estimate.intensity;
        assert!((0.0..=1.0).contains(&delta), "intensity {delta}");

        let expected = &estimate.target * delta + &estimate.sample * (1.0 - delta);
        for (a, b) in estimate.covariance.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_full_intensity_returns_target() {
        let config = LedoitWolfConfig {
            intensity: Some(1.0),
            ..Default::default()
        };
        let estimate = LedoitWolfEstimator::new(config).shrink(&panel()).unwrap();
        assert_eq!(estimate.intensity, 1.0);
        assert_eq!(estimate.covariance, estimate.target);
    }

    #[test]
    fn test_fixed_intensity_out_of_range() {
        let config = LedoitWolfConfig {
            intensity: Some(1.5),
            ..Default::default()
        };
        assert!(LedoitWolfEstimator::new(config).estimate(&panel()).is_err());
    }

    #[test]
    fn test_zero_variance_column_rejected() {
        let mut returns = panel();
        returns.column_mut(2).fill(0.0);
        assert!(matches!(
            LedoitWolfEstimator::default().estimate(&returns),
            Err(CovarianceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_single_asset_has_no_shrinkage_effect() {
        let returns = panel().column(0).to_owned().insert_axis(Axis(1));
        let estimate = LedoitWolfEstimator::default().shrink(&returns).unwrap();
        assert_relative_eq!(
            estimate.covariance[[0, 0]],
            estimate.sample[[0, 0]],
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_two_assets_match_constant_correlation_target() {
        // With two assets the average correlation is the sample correlation
        let returns = panel().slice(ndarray::s![.., 0..2]).to_owned();
        let estimate = LedoitWolfEstimator::default().shrink(&returns).unwrap();
        for (a, b) in estimate.covariance.iter().zip(estimate.sample.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }
}
