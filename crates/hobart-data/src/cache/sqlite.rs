//! SQLite storage for daily quotes.

use crate::error::{DataError, Result};
use crate::quotes::{CLOSE, DIVIDENDS, Quote, QuoteSource, SYMBOL, frame_dates};
use chrono::{NaiveDate, Utc};
use polars::prelude::*;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed quote store.
///
/// The store only persists what it is given. Downloading is the job of an
/// external updater, which can use [`SqliteQuoteStore::last_date`] to fetch
/// only the missing tail of each history.
#[derive(Debug)]
pub struct SqliteQuoteStore {
    conn: Mutex<Connection>,
}

impl SqliteQuoteStore {
    /// Open (or create) a store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open the store at [`SqliteQuoteStore::default_path`].
    pub fn open_default() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Default on-disk location inside the user cache directory.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hobart")
            .join("quotes.db")
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DataError::Cache("quote store connection poisoned".to_string()))
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                dividends REAL NOT NULL DEFAULT 0,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, date)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quotes_symbol_date ON quotes(symbol, date)",
            [],
        )?;
        Ok(())
    }

    /// Stored quotes of `symbol` up to and including `end`, oldest first.
    ///
    /// A symbol with no stored rows at all is reported as
    /// [`DataError::UnknownItem`].
    pub fn get_quotes(&self, symbol: &str, end: NaiveDate) -> Result<Vec<Quote>> {
        let conn = self.lock()?;

        let known: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quotes WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        if known == 0 {
            return Err(DataError::unknown_quotes(symbol));
        }

        let mut stmt = conn.prepare(
            "SELECT date, close, dividends
             FROM quotes
             WHERE symbol = ?1 AND date <= ?2
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(
            params![symbol, end.format(DATE_FORMAT).to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            },
        )?;

        let mut quotes = Vec::new();
        for row in rows {
            let (date, close, dividends) = row?;
            let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|e| DataError::Parse(format!("Invalid date {date}: {e}")))?;
            quotes.push(Quote {
                date,
                close,
                dividends,
            });
        }
        Ok(quotes)
    }

    /// Store a quote frame (`date`, `symbol`, `close`, `dividends`).
    ///
    /// Existing rows for the same `(symbol, date)` are replaced. Returns the
    /// number of rows written.
    pub fn put_quotes(&self, df: &DataFrame) -> Result<usize> {
        let cached_at = Utc::now().to_rfc3339();

        let symbols = df.column(SYMBOL)?.str()?;
        let dates = frame_dates(df)?;
        let closes = df.column(CLOSE)?.f64()?;
        let dividends = df.column(DIVIDENDS)?.f64()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for i in 0..df.height() {
            let symbol = symbols
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?;
            let date = dates[i].format(DATE_FORMAT).to_string();
            let close = closes
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing close".to_string()))?;
            let dividend = dividends.get(i).unwrap_or(0.0);

            tx.execute(
                "INSERT OR REPLACE INTO quotes (symbol, date, close, dividends, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![symbol, date, close, dividend, cached_at],
            )?;
        }

        tx.commit()?;
        debug!(rows = df.height(), "stored quotes");
        Ok(df.height())
    }

    /// Most recent stored date of `symbol`, if any.
    pub fn last_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let conn = self.lock()?;
        let last: Option<String> = conn.query_row(
            "SELECT MAX(date) FROM quotes WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        last.map(|d| {
            NaiveDate::parse_from_str(&d, DATE_FORMAT)
                .map_err(|e| DataError::Parse(format!("Invalid date {d}: {e}")))
        })
        .transpose()
    }

    /// All stored symbols, sorted.
    pub fn symbols(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT symbol FROM quotes ORDER BY symbol")?;
        let symbols = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(symbols)
    }

    /// Remove every stored quote of `symbol`.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM quotes WHERE symbol = ?1", params![symbol])?;
        Ok(())
    }

    /// Store statistics.
    pub fn stats(&self) -> Result<QuoteStoreStats> {
        let conn = self.lock()?;
        let (total, symbols, first, last): (i64, i64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT symbol), MIN(date), MAX(date) FROM quotes",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let parse =
            |d: Option<String>| d.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok());
        Ok(QuoteStoreStats {
            total_quotes: total as usize,
            unique_symbols: symbols as usize,
            first_date: parse(first),
            last_date: parse(last),
        })
    }
}

impl QuoteSource for SqliteQuoteStore {
    fn history(&self, symbol: &str, end: NaiveDate) -> Result<Vec<Quote>> {
        self.get_quotes(symbol, end)
    }
}

/// Quote store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteStoreStats {
    /// Total number of quote records
    pub total_quotes: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
    /// Earliest stored date
    pub first_date: Option<NaiveDate>,
    /// Latest stored date
    pub last_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::quotes_to_frame;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn seeded() -> SqliteQuoteStore {
        let store = SqliteQuoteStore::in_memory().unwrap();
        let df = quotes_to_frame(
            "AAA",
            &[
                Quote::new(date(1), 10.0),
                Quote::new(date(2), 10.2).with_dividends(0.3),
                Quote::new(date(5), 10.1),
            ],
        )
        .unwrap();
        store.put_quotes(&df).unwrap();
        store
    }

    #[test]
    fn test_store_initialization() {
        let store = SqliteQuoteStore::in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_put_and_get_quotes() {
        let store = seeded();
        let quotes = store.get_quotes("AAA", date(2)).unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].date, date(2));
        assert_eq!(quotes[1].dividends, 0.3);
    }

    #[test]
    fn test_put_replaces_existing_rows() {
        let store = seeded();
        let df = quotes_to_frame("AAA", &[Quote::new(date(5), 12.0)]).unwrap();
        store.put_quotes(&df).unwrap();

        let quotes = store.get_quotes("AAA", date(28)).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[2].close, 12.0);
    }

    #[test]
    fn test_unknown_symbol() {
        let store = seeded();
        assert!(matches!(
            store.get_quotes("ZZZ", date(28)),
            Err(DataError::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_last_date() {
        let store = seeded();
        assert_eq!(store.last_date("AAA").unwrap(), Some(date(5)));
        assert_eq!(store.last_date("ZZZ").unwrap(), None);
    }

    #[test]
    fn test_stats() {
        let store = SqliteQuoteStore::in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_quotes, 0);
        assert_eq!(stats.first_date, None);

        let store = seeded();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_quotes, 3);
        assert_eq!(stats.unique_symbols, 1);
        assert_eq!(stats.first_date, Some(date(1)));
        assert_eq!(stats.last_date, Some(date(5)));
    }

    #[test]
    fn test_clear_symbol() {
        let store = seeded();
        store.clear_symbol("AAA").unwrap();
        assert!(store.symbols().unwrap().is_empty());
    }
}
