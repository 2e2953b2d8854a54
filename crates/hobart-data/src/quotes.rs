//! The quote source interface.
//!
//! Every price read by the forecasting pipeline goes through [`QuoteSource`].
//! A source returns a long frame with one row per `(date, symbol)`:
//!
//! | column | dtype |
//! |---|---|
//! | `date` | `Date` |
//! | `symbol` | `String` |
//! | `close` | `f64` |
//! | `dividends` | `f64` |
//!
//! Dividends are the cash amount paid on that date, zero on ordinary days.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date column name.
pub const DATE: &str = "date";
/// Security identifier column name.
pub const SYMBOL: &str = "symbol";
/// Closing price column name.
pub const CLOSE: &str = "close";
/// Dividend cash amount column name.
pub const DIVIDENDS: &str = "dividends";

/// Days from 0001-01-01 to 1970-01-01, the origin of polars `Date` values.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single daily quote for one security.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
    /// Dividend paid on this date
    pub dividends: f64,
}

impl Quote {
    /// Create a quote without a dividend.
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            dividends: 0.0,
        }
    }

    /// Attach a dividend payment.
    pub const fn with_dividends(mut self, dividends: f64) -> Self {
        self.dividends = dividends;
        self
    }
}

/// A read-only provider of daily quotes.
///
/// Implementations own their synchronization. Requests for a symbol the
/// source has never seen fail with [`DataError::UnknownItem`].
pub trait QuoteSource: Send + Sync + fmt::Debug {
    /// Full quote history of `symbol` up to and including `end`, oldest first.
    fn history(&self, symbol: &str, end: NaiveDate) -> Result<Vec<Quote>>;

    /// Quotes for several symbols as one long frame.
    ///
    /// Rows are grouped by symbol in request order and sorted by date within
    /// each symbol.
    fn quotes(&self, symbols: &[String], end: NaiveDate) -> Result<DataFrame> {
        let mut frames = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let history = self.history(symbol, end)?;
            frames.push(quotes_to_frame(symbol, &history)?.lazy());
        }
        if frames.is_empty() {
            return empty_quotes_frame();
        }
        Ok(concat(frames, UnionArgs::default())?.collect()?)
    }
}

/// Build a quote frame for one symbol.
pub fn quotes_to_frame(symbol: &str, quotes: &[Quote]) -> Result<DataFrame> {
    let mut dates = Vec::with_capacity(quotes.len());
    let mut closes = Vec::with_capacity(quotes.len());
    let mut dividends = Vec::with_capacity(quotes.len());

    for quote in quotes {
        if !quote.close.is_finite() || quote.close <= 0.0 {
            return Err(DataError::Parse(format!(
                "Invalid close {} for {} on {}",
                quote.close, symbol, quote.date
            )));
        }
        dates.push(date_to_days(quote.date));
        closes.push(quote.close);
        dividends.push(quote.dividends);
    }

    let symbols = vec![symbol.to_string(); quotes.len()];
    let dates = Series::new(DATE.into(), dates).cast(&DataType::Date)?;
    Ok(DataFrame::new(vec![
        dates.into(),
        Series::new(SYMBOL.into(), symbols).into(),
        Series::new(CLOSE.into(), closes).into(),
        Series::new(DIVIDENDS.into(), dividends).into(),
    ])?)
}

/// Physical polars `Date` value of `date`: days since 1970-01-01.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Date of a physical polars `Date` value.
pub fn days_to_date(days: i32) -> Result<NaiveDate> {
    days.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| DataError::Parse(format!("Date out of range: {days} days from epoch")))
}

/// The `date` column of a frame as dates; nulls are an error.
pub fn frame_dates(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    let days = df
        .column(DATE)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .map(|value| {
            let value = value.ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
            days_to_date(value)
        })
        .collect()
}

/// An empty frame with the quote schema.
pub fn empty_quotes_frame() -> Result<DataFrame> {
    quotes_to_frame("", &[])
}
