//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use dart_core::{CorpCode, DartError, Period, Record, ReportCache, ReportCategory, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for disclosure reports.
///
/// This cache stores data in a SQLite database file, providing persistence across
/// application restarts. Each report is stored as one JSON array of records.
#[derive(Debug)]
pub struct SqliteReportCache {
    conn: Mutex<Connection>,
}

impl SqliteReportCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DartError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DartError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS report_cache (
                provider TEXT NOT NULL,
                category TEXT NOT NULL,
                corp_code TEXT NOT NULL,
                year INTEGER NOT NULL,
                quarter INTEGER NOT NULL,
                data_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, category, corp_code, year, quarter)
            )",
            [],
        )
        .map_err(|e| DartError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_report_cache_cached_at
             ON report_cache(cached_at)",
            [],
        )
        .map_err(|e| DartError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ReportCache for SqliteReportCache {
    #[instrument(skip(self), fields(provider = %provider, category = %category, corp_code = %corp_code, period = %period))]
    async fn get_report(
        &self,
        provider: &str,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Option<Vec<Record>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT data_json FROM report_cache
                 WHERE provider = ?1 AND category = ?2 AND corp_code = ?3
                   AND year = ?4 AND quarter = ?5",
                params![
                    provider,
                    category.as_str(),
                    corp_code.as_str(),
                    period.year,
                    period.quarter.number()
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        match result {
            Some(json) => {
                let records: Vec<Record> =
                    serde_json::from_str(&json).map_err(|e| DartError::Parse(e.to_string()))?;
                debug!("Found {} cached records", records.len());
                Ok(Some(records))
            }
            None => {
                debug!("No cached report found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, records), fields(provider = %provider, category = %category, corp_code = %corp_code, period = %period, count = records.len()))]
    async fn put_report(
        &self,
        provider: &str,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
        records: &[Record],
    ) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let data_json =
            serde_json::to_string(records).map_err(|e| DartError::Parse(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO report_cache
             (provider, category, corp_code, year, quarter, data_json, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                provider,
                category.as_str(),
                corp_code.as_str(),
                period.year,
                period.quarter.number(),
                data_json,
                cached_at
            ],
        )
        .map_err(|e| DartError::Cache(e.to_string()))?;

        debug!("Cached {} records", records.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| DartError::Cache(format!("Invalid TTL duration: {}", e)))?;
        let cutoff_str = cutoff.to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM report_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| DartError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Invalidated {} stale cache entries", deleted);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DartError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM report_cache", [])
            .map_err(|e| DartError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
