//! Cache-first decorator for disclosure providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use dart_core::{
    CorpCode, DisclosureProvider, Period, Record, ReportCache, ReportCategory, Result,
};

/// Longest wait between two sweeps of stale entries.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Provider that answers from a [`ReportCache`] before calling the wrapped provider.
///
/// Only non-empty results are stored, since a period with no filing today may
/// have one tomorrow. Cache failures are logged and otherwise ignored.
///
/// With [`with_ttl`](Self::with_ttl), entries older than the TTL are swept out
/// before a lookup, so corrected filings are picked up again.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use dart::{CachedProvider, InMemoryReportCache, OpenDartProvider};
///
/// let provider = CachedProvider::new(
///     Arc::new(OpenDartProvider::new("your-api-key")),
///     Arc::new(InMemoryReportCache::new()),
/// );
/// ```
pub struct CachedProvider {
    inner: Arc<dyn DisclosureProvider>,
    cache: Arc<dyn ReportCache>,
    ttl: Option<Duration>,
    last_sweep: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for CachedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedProvider")
            .field("inner", &self.inner)
            .field("cache", &"configured")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CachedProvider {
    /// Wraps `inner` with `cache`.
    #[must_use]
    pub fn new(inner: Arc<dyn DisclosureProvider>, cache: Arc<dyn ReportCache>) -> Self {
        Self {
            inner,
            cache,
            ttl: None,
            last_sweep: Mutex::new(None),
        }
    }

    /// Expire cached reports older than `ttl`.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Removes stale entries, at most once per sweep interval.
    async fn sweep_stale(&self) {
        let Some(ttl) = self.ttl else {
            return;
        };

        let mut last_sweep = self.last_sweep.lock().await;
        if last_sweep.is_some_and(|at| at.elapsed() < ttl.min(MAX_SWEEP_INTERVAL)) {
            return;
        }

        match self.cache.invalidate_stale(ttl).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Expired cached reports"),
            Err(e) => warn!(error = %e, "Failed to expire cached reports"),
        }
        *last_sweep = Some(Instant::now());
    }
}

#[async_trait]
impl DisclosureProvider for CachedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_report(
        &self,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Vec<Record>> {
        let provider = self.inner.name();
        self.sweep_stale().await;

        match self
            .cache
            .get_report(provider, category, corp_code, period)
            .await
        {
            Ok(Some(cached)) => {
                debug!(
                    provider,
                    category = %category,
                    corp_code = %corp_code,
                    period = %period,
                    "Cache hit for report"
                );
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(provider, error = %e, "Failed to read report cache");
            }
        }

        let records = self.inner.fetch_report(category, corp_code, period).await?;

        if !records.is_empty() {
            if let Err(e) = self
                .cache
                .put_report(provider, category, corp_code, period, &records)
                .await
            {
                warn!(provider, error = %e, "Failed to cache report");
            }
        }

        Ok(records)
    }
}
