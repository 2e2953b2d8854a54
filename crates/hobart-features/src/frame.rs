//! Helpers for reading provider frames back into Rust values.

use crate::error::Result;
use chrono::NaiveDate;
use hobart_data::{DataError, SYMBOL, frame_dates};
use polars::prelude::*;

/// Daily total return column produced by [`crate::ProviderContext::daily_returns`].
pub const RETURNS: &str = "returns";

/// Fixed window that needs a full window of observations.
pub(crate) fn window(days: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: days,
        min_periods: days,
        ..Default::default()
    }
}

/// The `date` column as dates; nulls are an error.
pub fn dates(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    Ok(frame_dates(df)?)
}

/// The `symbol` column; nulls are an error.
pub fn symbols(df: &DataFrame) -> Result<Vec<String>> {
    df.column(SYMBOL)?
        .str()?
        .into_iter()
        .map(|value| -> Result<String> {
            Ok(value
                .map(str::to_string)
                .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?)
        })
        .collect()
}

/// A numeric column as `f64`, with nulls mapped to `NaN`.
pub fn floats(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}
