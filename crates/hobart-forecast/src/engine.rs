//! Forecast Engine
//!
//! Turns an example set and a tuned model into a [`Forecast`]:
//!
//! 1. build the example set for the requested securities and date
//! 2. tune the model (fit, validate, refit on the full history)
//! 3. predict the mean return of every security on the as-of date
//! 4. estimate the shrinkage covariance and check its diagonal against the
//!    squared normalization scale
//!
//! Mean and covariance are validated in daily units and scaled to yearly
//! units afterwards when annualizing.

use crate::cache::ForecastCache;
use crate::config::{ForecastConfig, ForecastParams};
use crate::error::{ForecastError, Result};
use crate::example_set::ExampleSet;
use crate::forecast::Forecast;
use crate::tuner::{HoldoutTuner, ModelTuner, TunedModel};
use chrono::NaiveDate;
use hobart_data::QuoteSource;
use hobart_features::{LabelConfig, LabelProvider, ProviderConfig, ProviderContext};
use hobart_model::{Pool, Regressor};
use hobart_risk::{CovarianceError, LedoitWolfEstimator, average_correlation, scale_correlation};
use ndarray::{Array1, Array2, Axis};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Shrinkage covariance with its summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceForecast {
    /// Covariance in daily units
    pub cov: Array2<f64>,
    /// Average off-diagonal correlation
    pub average_cor: f64,
    /// Shrinkage intensity in `[0, 1]`
    pub shrinkage: f64,
}

/// Builds forecasts from a quote source.
#[derive(Debug)]
pub struct ForecastEngine {
    source: Arc<dyn QuoteSource>,
    config: ForecastConfig,
    tuner: Box<dyn ModelTuner>,
}

impl ForecastEngine {
    /// Engine with a [`HoldoutTuner`].
    pub fn new(source: Arc<dyn QuoteSource>, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            tuner: Box::new(HoldoutTuner::new()),
        })
    }

    /// Replace the tuner.
    pub fn with_tuner(mut self, tuner: impl ModelTuner + 'static) -> Self {
        self.tuner = Box::new(tuner);
        self
    }

    /// Engine configuration.
    pub const fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Example set for one request.
    pub fn example_set(
        &self,
        securities: &[String],
        date: NaiveDate,
        params: &ForecastParams,
    ) -> Result<ExampleSet> {
        ExampleSet::new(
            securities,
            date,
            &params.data,
            self.source.clone(),
            self.config.examples,
        )
    }

    /// Expected daily return of every row of the prediction pool.
    pub fn predict_mean(&self, model: &dyn Regressor, prediction: &Pool) -> Result<Array1<f64>> {
        let mean = model.predict(prediction)?;
        if mean.len() != prediction.len() {
            return Err(ForecastError::Consistency(format!(
                "model returned {} predictions for {} securities",
                mean.len(),
                prediction.len()
            )));
        }
        Ok(mean)
    }

    /// Check that `cov` is square, sized to the prediction pool and has
    /// `scale²` on its diagonal.
    pub fn validate_cov(&self, cov: &Array2<f64>, prediction: &Pool) -> Result<()> {
        let (rows, cols) = cov.dim();
        if rows != cols || rows != prediction.len() {
            return Err(ForecastError::Consistency(format!(
                "covariance is {rows}x{cols} for {} securities",
                prediction.len()
            )));
        }

        let tolerance = &self.config.tolerance;
        for (i, scale) in prediction.scale().iter().enumerate() {
            let expected = scale * scale;
            if !tolerance.is_close(cov[[i, i]], expected) {
                return Err(ForecastError::Consistency(format!(
                    "computed covariance does not match the normalization basis: \
                     cov[{i}, {i}] = {} but scale² = {expected}",
                    cov[[i, i]]
                )));
            }
        }
        Ok(())
    }

    /// Shrinkage covariance of `securities` as of `date`.
    ///
    /// Uses non-overlapping trailing returns over the tuned label horizon,
    /// standardized per security, so the shrunk matrix is a correlation
    /// matrix. It is rescaled by the prediction pool scale and validated.
    pub fn ledoit_wolf_cov(
        &self,
        securities: &[String],
        date: NaiveDate,
        prediction: &Pool,
        tuned: &TunedModel,
    ) -> Result<CovarianceForecast> {
        let label_spec = tuned.params.data.first().ok_or_else(|| {
            ForecastError::Configuration("tuned parameters have no label".to_string())
        })?;
        let label_config = *LabelConfig::expect_from(label_spec)?;

        let ctx = Arc::new(ProviderContext::new(
            securities.to_vec(),
            date,
            self.source.clone(),
        ));
        let label = LabelProvider::new(ctx, label_config)?;
        let trailing = label.trailing_returns(label_config.days)?;

        let required = self.config.covariance.min_observations.max(2);
        let periods = trailing.dates.len();
        if periods < required {
            return Err(ForecastError::insufficient("covariance", required, periods));
        }

        let standardized = standardize(&trailing.returns, securities)?;
        let estimate =
            LedoitWolfEstimator::new(self.config.covariance.clone()).shrink(&standardized)?;

        let average_cor = average_correlation(&estimate.covariance);
        let cov = scale_correlation(&estimate.covariance, prediction.scale())?;
        self.validate_cov(&cov, prediction)?;

        debug!(
            periods,
            days = label_config.days,
            shrinkage = estimate.intensity,
            average_cor,
            "shrinkage covariance"
        );

        Ok(CovarianceForecast {
            cov,
            average_cor,
            shrinkage: estimate.intensity,
        })
    }

    /// Forecast for `securities` as of `date` under `params`.
    #[instrument(skip_all, fields(securities = securities.len(), %date))]
    pub fn get_forecast(
        &self,
        securities: &[String],
        date: NaiveDate,
        params: &ForecastParams,
    ) -> Result<Forecast> {
        let examples = self.example_set(securities, date, params)?;
        let tuned = self.tuner.tune(params, &examples)?;

        let (_, prediction) = examples.production_pools()?;
        let mean = self.predict_mean(&*tuned.model, &prediction)?;
        let covariance = self.ledoit_wolf_cov(securities, date, &prediction, &tuned)?;

        let factor = self.config.annualization_factor();
        info!(
            num_cases = tuned.diagnostics.num_cases,
            r = tuned.diagnostics.r,
            shrinkage = covariance.shrinkage,
            "forecast ready"
        );

        Ok(Forecast {
            date,
            securities: securities.to_vec(),
            mean: mean * factor,
            cov: covariance.cov * factor,
            diagnostics: tuned.diagnostics,
            average_cor: covariance.average_cor,
            shrinkage: covariance.shrinkage,
            params: tuned.params,
        })
    }

    /// Cached forecast if still valid for the request, otherwise a fresh one
    /// that replaces it.
    pub fn cached_forecast(
        &self,
        cache: &ForecastCache,
        securities: &[String],
        date: NaiveDate,
        params: &ForecastParams,
    ) -> Result<Arc<Forecast>> {
        if let Some(forecast) = cache.lookup(securities, date, params) {
            debug!(%date, "forecast cache hit");
            return Ok(forecast);
        }
        let forecast = Arc::new(self.get_forecast(securities, date, params)?);
        cache.insert(forecast.clone());
        Ok(forecast)
    }
}

/// Z-score every column with its population standard deviation.
fn standardize(returns: &Array2<f64>, securities: &[String]) -> Result<Array2<f64>> {
    let mean = returns
        .mean_axis(Axis(0))
        .ok_or_else(|| ForecastError::insufficient("covariance", 1, 0))?;
    let std = returns.std_axis(Axis(0), 0.0);

    if let Some(pos) = std.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
        return Err(CovarianceError::InvalidParameter(format!(
            "trailing returns of {} are constant",
            securities.get(pos).map_or("?", String::as_str)
        ))
        .into());
    }
    Ok((returns - &mean) / &std)
}
