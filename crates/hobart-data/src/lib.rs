#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod memory;
pub mod quotes;

pub use cache::{QuoteStoreStats, SqliteQuoteStore};
pub use error::{DataError, Result};
pub use memory::InMemoryQuotes;
pub use quotes::{
    CLOSE, DATE, DIVIDENDS, Quote, QuoteSource, SYMBOL, date_to_days, days_to_date,
    empty_quotes_frame, frame_dates, quotes_to_frame,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
