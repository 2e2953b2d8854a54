//! Forecast Cache Guard
//!
//! A cached forecast is reusable only for the exact request it was built
//! for: the same securities in the same order, the same date and equal
//! parameters.

use crate::config::ForecastParams;
use crate::forecast::Forecast;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Whether `forecast` answers the request `(securities, date, params)`.
pub fn validate_cache(
    forecast: &Forecast,
    securities: &[String],
    date: NaiveDate,
    params: &ForecastParams,
) -> bool {
    forecast.securities == securities && forecast.date == date && forecast.params == *params
}

/// Latest forecast per security tuple.
///
/// Concurrent writers for the same tuple race; the last insert wins.
#[derive(Debug, Default)]
pub struct ForecastCache {
    entries: RwLock<HashMap<Vec<String>, Arc<Forecast>>>,
}

impl ForecastCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest forecast for `securities`, valid or not.
    pub fn get(&self, securities: &[String]) -> Option<Arc<Forecast>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(securities)
            .cloned()
    }

    /// Forecast for the request if the cached one is still valid.
    pub fn lookup(
        &self,
        securities: &[String],
        date: NaiveDate,
        params: &ForecastParams,
    ) -> Option<Arc<Forecast>> {
        self.get(securities)
            .filter(|forecast| validate_cache(forecast, securities, date, params))
    }

    /// Store `forecast` under its securities, returning the one it replaces.
    pub fn insert(&self, forecast: Arc<Forecast>) -> Option<Arc<Forecast>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(forecast.securities.clone(), forecast)
    }

    /// Number of cached tuples.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
