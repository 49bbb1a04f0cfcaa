//! Cache trait for storing fetched reports.
//!
//! This module defines the [`ReportCache`] trait that provides a unified interface
//! for caching report records per provider, category, company and period.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    period::Period,
    types::{CorpCode, Record, ReportCategory},
};

/// Trait for caching fetched reports.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated API calls; a single filing can take tens of seconds to crawl.
#[async_trait]
pub trait ReportCache: Send + Sync {
    /// Retrieves cached records for a report.
    ///
    /// Returns `Ok(Some(records))` if cached, `Ok(None)` if not cached.
    async fn get_report(
        &self,
        provider: &str,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Option<Vec<Record>>>;

    /// Stores the records of a report, replacing any previous entry.
    async fn put_report(
        &self,
        provider: &str,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
        records: &[Record],
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
