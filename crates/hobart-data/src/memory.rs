//! In-memory quote source.

use crate::error::{DataError, Result};
use crate::quotes::{Quote, QuoteSource};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Quote source backed by a map of symbol to daily history.
///
/// Histories are kept sorted by date with at most one quote per day; a later
/// insert for an existing date replaces the earlier quote.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuotes {
    histories: BTreeMap<String, Vec<Quote>>,
}

impl InMemoryQuotes {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or extend the history of a symbol.
    pub fn insert(&mut self, symbol: impl Into<String>, quotes: impl IntoIterator<Item = Quote>) {
        let history = self.histories.entry(symbol.into()).or_default();
        for quote in quotes {
            match history.binary_search_by_key(&quote.date, |q| q.date) {
                Ok(pos) => history[pos] = quote,
                Err(pos) => history.insert(pos, quote),
            }
        }
    }

    /// Builder-style variant of [`InMemoryQuotes::insert`].
    pub fn with_symbol(
        mut self,
        symbol: impl Into<String>,
        quotes: impl IntoIterator<Item = Quote>,
    ) -> Self {
        self.insert(symbol, quotes);
        self
    }

    /// Symbols with at least one stored quote, sorted.
    pub fn symbols(&self) -> Vec<String> {
        self.histories.keys().cloned().collect()
    }

    /// Number of stored quotes across all symbols.
    pub fn len(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }

    /// Whether the source holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuoteSource for InMemoryQuotes {
    fn history(&self, symbol: &str, end: NaiveDate) -> Result<Vec<Quote>> {
        let history = self
            .histories
            .get(symbol)
            .ok_or_else(|| DataError::unknown_quotes(symbol))?;
        let cut = history.partition_point(|q| q.date <= end);
        Ok(history[..cut].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{CLOSE, SYMBOL};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn source() -> InMemoryQuotes {
        InMemoryQuotes::new()
            .with_symbol(
                "AAA",
                vec![
                    Quote::new(date(3), 10.5),
                    Quote::new(date(2), 10.0),
                    Quote::new(date(4), 11.0),
                ],
            )
            .with_symbol("BBB", vec![Quote::new(date(2), 50.0)])
    }

    #[test]
    fn test_history_sorted_and_truncated() {
        let history = source().history("AAA", date(3)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, date(2));
        assert_eq!(history[1].close, 10.5);
    }

    #[test]
    fn test_insert_replaces_same_date() {
        let mut quotes = source();
        quotes.insert("AAA", vec![Quote::new(date(2), 9.0)]);
        let history = quotes.history("AAA", date(31)).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].close, 9.0);
    }

    #[test]
    fn test_unknown_symbol() {
        let err = source().history("ZZZ", date(31)).unwrap_err();
        assert!(matches!(err, DataError::UnknownItem { .. }));
    }

    #[test]
    fn test_quotes_frame_keeps_request_order() {
        let symbols = vec!["BBB".to_string(), "AAA".to_string()];
        let df = source().quotes(&symbols, date(31)).unwrap();

        assert_eq!(df.height(), 4);
        let syms = df.column(SYMBOL).unwrap().str().unwrap();
        assert_eq!(syms.get(0), Some("BBB"));
        assert_eq!(syms.get(1), Some("AAA"));
        assert_eq!(df.column(CLOSE).unwrap().f64().unwrap().get(3), Some(11.0));
    }
}
