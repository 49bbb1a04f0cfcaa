//! No-op cache implementation.

use async_trait::async_trait;
use dart_core::{CorpCode, Period, Record, ReportCache, ReportCategory, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_report` always returns `Ok(None)` and `put_report` returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReportCache;

impl NoopReportCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportCache for NoopReportCache {
    async fn get_report(
        &self,
        _provider: &str,
        _category: ReportCategory,
        _corp_code: &CorpCode,
        _period: Period,
    ) -> Result<Option<Vec<Record>>> {
        trace!("NoopReportCache: get_report called, returning None");
        Ok(None)
    }

    async fn put_report(
        &self,
        _provider: &str,
        _category: ReportCategory,
        _corp_code: &CorpCode,
        _period: Period,
        _records: &[Record],
    ) -> Result<()> {
        trace!("NoopReportCache: put_report called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
