//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use dart_core::{CorpCode, Period, Record, ReportCache, ReportCategory, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for report cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReportKey {
    provider: String,
    category: ReportCategory,
    corp_code: CorpCode,
    period: Period,
}

/// Simple in-memory cache for testing and development.
///
/// Data is stored in a `RwLock`-protected `HashMap` and is lost when the cache
/// is dropped. Records are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryReportCache {
    reports: RwLock<HashMap<ReportKey, CacheEntry<Vec<Record>>>>,
}

impl InMemoryReportCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached reports.
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait]
impl ReportCache for InMemoryReportCache {
    #[instrument(skip(self), fields(provider = %provider, category = %category, corp_code = %corp_code, period = %period))]
    async fn get_report(
        &self,
        provider: &str,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Option<Vec<Record>>> {
        let key = ReportKey {
            provider: provider.to_string(),
            category,
            corp_code: corp_code.clone(),
            period,
        };

        let cache = self.reports.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for report");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for report");
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
        let key = ReportKey {
            provider: provider.to_string(),
            category,
            corp_code: corp_code.clone(),
            period,
        };

        let mut cache = self.reports.write().await;
        cache.insert(key, CacheEntry::new(records.to_vec()));
        debug!("Cached {} records", records.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.reports.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.reports.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dart_core::Quarter;

    fn dividend_rows() -> Vec<Record> {
        vec![
            Record::new()
                .with_field("se", "주당 현금배당금(원)")
                .with_field("thstrm", "1,446"),
            Record::new()
                .with_field("se", "현금배당성향(%)")
                .with_field("thstrm", "29.2"),
        ]
    }

    #[tokio::test]
    async fn test_memory_cache_report() {
        let cache = InMemoryReportCache::new();
        let code = CorpCode::new("00126380");
        let period = Period::new(2024, Quarter::Q4);

        // Initially no data
        let result = cache
            .get_report("test", ReportCategory::Dividends, &code, period)
            .await
            .unwrap();
        assert!(result.is_none());

        // Store data
        cache
            .put_report("test", ReportCategory::Dividends, &code, period, &dividend_rows())
            .await
            .unwrap();

        // Retrieve data
        let result = cache
            .get_report("test", ReportCategory::Dividends, &code, period)
            .await
            .unwrap();
        assert_eq!(result, Some(dividend_rows()));

        // Other periods and categories are separate entries
        let other = cache
            .get_report(
                "test",
                ReportCategory::Dividends,
                &code,
                Period::new(2024, Quarter::Q3),
            )
            .await
            .unwrap();
        assert!(other.is_none());
        let other = cache
            .get_report("test", ReportCategory::FinancialStatements, &code, period)
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale() {
        let cache = InMemoryReportCache::new();
        let code = CorpCode::new("00126380");
        let period = Period::new(2024, Quarter::Q4);

        cache
            .put_report("test", ReportCategory::Dividends, &code, period, &dividend_rows())
            .await
            .unwrap();

        assert_eq!(
            cache
                .invalidate_stale(Duration::from_secs(3600))
                .await
                .unwrap(),
            0
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(
            cache
                .invalidate_stale(Duration::from_millis(1))
                .await
                .unwrap(),
            1
        );
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryReportCache::new();
        let code = CorpCode::new("00126380");
        let period = Period::new(2024, Quarter::Q4);

        // Store some data
        cache
            .put_report("test", ReportCategory::Dividends, &code, period, &dividend_rows())
            .await
            .unwrap();
        assert_eq!(cache.len().await, 1);

        // Clear cache
        cache.clear().await.unwrap();

        // Verify data is gone
        let result = cache
            .get_report("test", ReportCategory::Dividends, &code, period)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
