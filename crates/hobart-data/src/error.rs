//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading or storing quotes.
#[derive(Debug, Error)]
pub enum DataError {
    /// The requested dataset does not exist in the source
    #[error("No {collection} data for {item}")]
    UnknownItem {
        /// Collection that was queried (e.g. "quotes")
        collection: String,
        /// Item that was requested
        item: String,
    },

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Shorthand for an [`DataError::UnknownItem`] in the quotes collection.
    pub fn unknown_quotes(symbol: impl Into<String>) -> Self {
        Self::UnknownItem {
            collection: "quotes".to_string(),
            item: symbol.into(),
        }
    }
}
