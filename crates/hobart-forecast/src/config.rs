//! Forecast configuration.
//!
//! Everything here is plain serde data with defaults, so a configuration file
//! only needs the fields it changes:
//!
//! ```json
//! { "examples": { "train_val_split": 0.8 }, "annualize": false }
//! ```

use crate::error::{ForecastError, Result};
use hobart_features::{ProviderKind, ProviderSpec};
use hobart_model::ModelParams;
use hobart_risk::LedoitWolfConfig;
use serde::{Deserialize, Serialize};

/// Example set construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleSetConfig {
    /// Share of distinct dates before the validation block (default: 0.9)
    pub train_val_split: f64,
    /// Minimum training rows (default: 30)
    pub min_train_rows: usize,
    /// Minimum validation rows (default: 5)
    pub min_validation_rows: usize,
}

impl Default for ExampleSetConfig {
    fn default() -> Self {
        Self {
            train_val_split: 0.9,
            min_train_rows: 30,
            min_validation_rows: 5,
        }
    }
}

/// Tolerance of the covariance diagonal against the squared scale.
///
/// A diagonal entry passes when `|cov_ii - scale_i²| <= atol + rtol * scale_i²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Relative tolerance (default: 1e-5)
    pub rtol: f64,
    /// Absolute tolerance (default: 1e-8)
    pub atol: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl ToleranceConfig {
    /// Whether `actual` matches `expected`.
    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

/// Forecast engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Example set settings
    pub examples: ExampleSetConfig,
    /// Shrinkage estimator settings
    pub covariance: LedoitWolfConfig,
    /// Covariance validation tolerance
    pub tolerance: ToleranceConfig,
    /// Scale daily mean and covariance to yearly units (default: true)
    pub annualize: bool,
    /// Trading days per year used when annualizing (default: 252)
    pub trading_days_per_year: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            examples: ExampleSetConfig::default(),
            covariance: LedoitWolfConfig::default(),
            tolerance: ToleranceConfig::default(),
            annualize: true,
            trading_days_per_year: 252,
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON configuration and check it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let split = self.examples.train_val_split;
        if !(split > 0.0 && split < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "train_val_split must be in (0, 1), got {split}"
            )));
        }
        if self.tolerance.rtol < 0.0 || self.tolerance.atol < 0.0 {
            return Err(ForecastError::Configuration(
                "tolerances must be non-negative".to_string(),
            ));
        }
        if self.annualize && self.trading_days_per_year == 0 {
            return Err(ForecastError::Configuration(
                "trading_days_per_year must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Factor applied to daily mean and covariance.
    pub fn annualization_factor(&self) -> f64 {
        if self.annualize {
            self.trading_days_per_year as f64
        } else {
            1.0
        }
    }
}

/// Parameters of one forecast: data providers and model.
///
/// `data` lists the Label spec first, the Scaler spec second and the
/// predictive providers after them. Two forecasts with equal parameters are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// Provider configurations
    pub data: Vec<ProviderSpec>,
    /// Model hyperparameters
    #[serde(default)]
    pub model: ModelParams,
}

impl Default for ForecastParams {
    fn default() -> Self {
        let data = [
            ProviderKind::Label,
            ProviderKind::Scaler,
            ProviderKind::Ticker,
            ProviderKind::Mom12m,
            ProviderKind::Mom1m,
            ProviderKind::DivYield,
            ProviderKind::RetMax,
            ProviderKind::ChMom6m,
        ]
        .into_iter()
        .map(ProviderSpec::default_for)
        .collect();
        Self {
            data,
            model: ModelParams::default(),
        }
    }
}

/// JSON form of [`ForecastParams`] before provider names are resolved.
#[derive(Deserialize)]
struct RawParams {
    data: Vec<serde_json::Value>,
    #[serde(default)]
    model: ModelParams,
}

impl ForecastParams {
    /// Parse JSON parameters.
    ///
    /// Provider names are resolved through the registry, so an unknown name
    /// or bad provider parameters are a [`ForecastError::Configuration`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawParams = serde_json::from_str(json)?;
        let data = raw
            .data
            .into_iter()
            .map(ProviderSpec::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            data,
            model: raw.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hobart_features::{LabelConfig, ScalerConfig, TickerConfig};
    use rstest::rstest;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ForecastConfig::from_json(
            r#"{"examples": {"train_val_split": 0.8}, "annualize": false}"#,
        )
        .unwrap();
        assert_eq!(config.examples.train_val_split, 0.8);
        assert_eq!(config.examples.min_train_rows, 30);
        assert_eq!(config.tolerance, ToleranceConfig::default());
        assert_eq!(config.annualization_factor(), 1.0);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::one(1.0)]
    #[case::negative(-0.5)]
    fn test_split_out_of_range(#[case] split: f64) {
        let json = format!(r#"{{"examples": {{"train_val_split": {split}}}}}"#);
        assert!(matches!(
            ForecastConfig::from_json(&json),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn test_tolerance() {
        let tol = ToleranceConfig::default();
        assert!(tol.is_close(9.0, 9.0));
        assert!(tol.is_close(9.0 + 5e-5, 9.0));
        assert!(!tol.is_close(9.1, 9.0));
    }

    #[test]
    fn test_params_json() {
        let params = ForecastParams::from_json(
            r#"{
                "data": [
                    {"Label": {"days": 10, "div_share": 0.0}},
                    {"Scaler": {"days": 60}},
                    {"Ticker": {}}
                ],
                "model": {"l2_reg": 2.0}
            }"#,
        )
        .unwrap();

        assert_eq!(
            params.data,
            vec![
                ProviderSpec::from(LabelConfig::default().with_days(10)),
                ProviderSpec::from(ScalerConfig { days: 60 }),
                ProviderSpec::from(TickerConfig {}),
            ]
        );
        assert_eq!(params.model.l2_reg, 2.0);
        assert!(params.model.fit_intercept);
    }

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let err = ForecastParams::from_json(
            r#"{
                "data": [
                    {"Label": {"days": 10, "div_share": 0.0}},
                    {"Scaler": {"days": 60}},
                    {"Mom3m": {"days": 10}}
                ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::Configuration(_)), "{err}");
        assert!(err.to_string().contains("Mom3m"));
    }

    #[test]
    fn test_bad_provider_parameter_is_configuration_error() {
        let err = ForecastParams::from_json(r#"{"data": [{"Scaler": {"days": -3}}]}"#).unwrap_err();
        assert!(matches!(err, ForecastError::Configuration(_)), "{err}");
    }

    #[test]
    fn test_malformed_json_stays_json_error() {
        let err = ForecastParams::from_json(r#"{"data": "#).unwrap_err();
        assert!(matches!(err, ForecastError::Json(_)));
    }

    #[test]
    fn test_default_params_order() {
        let params = ForecastParams::default();
        assert_eq!(params.data[0].kind(), ProviderKind::Label);
        assert_eq!(params.data[1].kind(), ProviderKind::Scaler);
        assert_eq!(params.data.len(), 8);
    }
}
