//! Model tuning collaborator.
//!
//! Searching hyperparameters is outside this crate. A tuner receives fixed
//! parameters and returns the production model with its diagnostics.

use crate::config::ForecastParams;
use crate::error::Result;
use crate::example_set::ExampleSet;
use crate::forecast::ModelDiagnostics;
use hobart_model::{Regressor, RidgeRegressor, ValidationScores};
use std::fmt;
use tracing::debug;

/// A production model and how it scored.
#[derive(Debug)]
pub struct TunedModel {
    /// Model fitted on the full training history
    pub model: Box<dyn Regressor>,
    /// Validation scores and importances
    pub diagnostics: ModelDiagnostics,
    /// Parameters the model was built with
    pub params: ForecastParams,
}

/// Produces a fitted production model for an example set.
pub trait ModelTuner: Send + Sync + fmt::Debug {
    /// Fit and score a model for `examples` under `params`.
    fn tune(&self, params: &ForecastParams, examples: &ExampleSet) -> Result<TunedModel>;
}

/// Fit on the training block, score on the validation block, then refit on
/// the whole history.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldoutTuner;

impl HoldoutTuner {
    /// Create a hold-out tuner.
    pub const fn new() -> Self {
        Self
    }
}

impl ModelTuner for HoldoutTuner {
    fn tune(&self, params: &ForecastParams, examples: &ExampleSet) -> Result<TunedModel> {
        let (train, validation) = examples.train_validation_pools(Some(params.data.as_slice()))?;

        let mut model = RidgeRegressor::new(params.model.clone())?;
        model.fit(&train)?;
        let predictions = model.predict(&validation)?;
        let scores = ValidationScores::compute(&validation, predictions.view())?;
        debug!(r = scores.r, r_rang = scores.r_rang, t = scores.t, "validation scores");

        let (history, _) = examples.production_pools()?;
        let mut model = RidgeRegressor::new(params.model.clone())?;
        model.fit(&history)?;

        let feature_importance = history
            .feature_names()
            .iter()
            .cloned()
            .zip(model.feature_importances()?)
            .collect();

        Ok(TunedModel {
            model: Box::new(model),
            diagnostics: ModelDiagnostics {
                num_cases: history.len(),
                num_features: history.num_features(),
                r: scores.r,
                r_rang: scores.r_rang,
                t: scores.t,
                feature_importance,
            },
            params: params.clone(),
        })
    }
}
