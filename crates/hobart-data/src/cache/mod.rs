//! Local quote storage.

pub mod sqlite;

pub use sqlite::{QuoteStoreStats, SqliteQuoteStore};
