//! The disclosure lookup tools.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use dart_core::{
    CategoryFetcher, CorpCode, CorpCodeResolver, DartError, DisclosureProvider, PeriodRequest,
    PeriodResolver, ProviderFetcher, Record, ReportCategory, Result,
};
use dart_opendart::OpenDartProvider;

use crate::config::DartConfig;

/// Company disclosure lookups by ticker or company name.
///
/// Every lookup resolves the company first, so an unknown identifier fails
/// with [`DartError::CorpNotFound`] before any report is fetched.
///
/// # Example
///
/// ```rust,ignore
/// use dart::{DartConfig, DartTools};
///
/// let tools = DartTools::from_config(&DartConfig::new("your-api-key"))?;
/// let records = tools.find_finance("005930", Some(2024), Some(4)).await?;
/// ```
#[derive(Clone)]
pub struct DartTools {
    corp_codes: Arc<dyn CorpCodeResolver>,
    provider: Arc<dyn DisclosureProvider>,
    today: Option<NaiveDate>,
}

impl std::fmt::Debug for DartTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartTools")
            .field("corp_codes", &self.corp_codes)
            .field("provider", &self.provider.name())
            .field("today", &self.today)
            .finish()
    }
}

impl DartTools {
    /// Create tools over a corp-code resolver and a disclosure provider.
    #[must_use]
    pub fn new(
        corp_codes: Arc<dyn CorpCodeResolver>,
        provider: Arc<dyn DisclosureProvider>,
    ) -> Self {
        Self {
            corp_codes,
            provider,
            today: None,
        }
    }

    /// Build the OpenDART-backed tools described by `config`.
    ///
    /// # Errors
    /// Returns [`DartError::ProviderNotConfigured`] without an API key, or a
    /// cache error if the report cache cannot be opened.
    pub fn from_config(config: &DartConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            DartError::ProviderNotConfigured("OpenDART API key (DART_API_KEY) is not set".into())
        })?;

        let opendart = Arc::new(
            OpenDartProvider::new(api_key).with_statement_division(config.statement_division()),
        );
        let provider = with_report_cache(opendart, config)?;

        debug!(?config, "Configured disclosure tools");
        Ok(Self::new(Arc::new(config.corp_code_registry()), provider))
    }

    /// Anchor period defaults to a fixed date instead of the current date.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The period resolver for a lookup starting now.
    #[must_use]
    pub fn resolver(&self) -> PeriodResolver {
        self.today.map_or_else(PeriodResolver::new, PeriodResolver::at)
    }

    /// Resolve a ticker or company name to its corp code.
    ///
    /// # Errors
    /// Returns [`DartError::Initialization`] if the corp-code table cannot be
    /// loaded, or [`DartError::CorpNotFound`] for an unknown identifier.
    pub async fn corp_code(&self, stock: &str) -> Result<CorpCode> {
        self.corp_codes.ensure_initialized().await?;
        self.corp_codes.fetch_corp_code(stock).await
    }

    /// Find a company's financial statements.
    ///
    /// # Errors
    /// See [`DartTools::find_compensation`].
    pub async fn find_finance(
        &self,
        stock: &str,
        year: Option<i32>,
        quarter: Option<u8>,
    ) -> Result<Vec<Record>> {
        self.find(stock, year, quarter, &[ReportCategory::FinancialStatements])
            .await
    }

    /// Find a company's dividend information.
    ///
    /// # Errors
    /// See [`DartTools::find_compensation`].
    pub async fn find_dividend(
        &self,
        stock: &str,
        year: Option<i32>,
        quarter: Option<u8>,
    ) -> Result<Vec<Record>> {
        self.find(stock, year, quarter, &[ReportCategory::Dividends])
            .await
    }

    /// Find director and auditor compensation.
    ///
    /// Returns per-director rows, then the total, then the five highest paid,
    /// each category resolved on its own.
    ///
    /// # Errors
    /// - [`DartError::InvalidParameter`] for a quarter outside 1-4
    /// - [`DartError::Initialization`] if the corp-code table cannot be loaded
    /// - [`DartError::CorpNotFound`] for an unknown identifier
    /// - Any provider error from a report fetch
    pub async fn find_compensation(
        &self,
        stock: &str,
        year: Option<i32>,
        quarter: Option<u8>,
    ) -> Result<Vec<Record>> {
        self.find(stock, year, quarter, &ReportCategory::COMPENSATION)
            .await
    }

    async fn find(
        &self,
        stock: &str,
        year: Option<i32>,
        quarter: Option<u8>,
        categories: &[ReportCategory],
    ) -> Result<Vec<Record>> {
        let request = PeriodRequest::from_parts(year, quarter)?;
        let corp_code = self.corp_code(stock).await?;

        let fetchers: Vec<ProviderFetcher<'_>> = categories
            .iter()
            .map(|&category| ProviderFetcher::new(self.provider.as_ref(), category))
            .collect();
        let fetchers: Vec<&dyn CategoryFetcher> = fetchers
            .iter()
            .map(|fetcher| fetcher as &dyn CategoryFetcher)
            .collect();

        let records = self
            .resolver()
            .aggregate(&corp_code, request, &fetchers)
            .await?;

        info!(
            stock,
            corp_code = %corp_code,
            categories = ?categories,
            count = records.len(),
            "Lookup complete"
        );
        Ok(records)
    }
}

#[cfg(feature = "cache-sqlite")]
fn with_report_cache(
    provider: Arc<dyn DisclosureProvider>,
    config: &DartConfig,
) -> Result<Arc<dyn DisclosureProvider>> {
    use crate::CachedProvider;
    use dart_cache::SqliteReportCache;

    match config.cache_path() {
        Some(path) => {
            let cache = SqliteReportCache::new(path)?;
            debug!(
                path = %path.display(),
                ttl_secs = config.cache_ttl().as_secs(),
                "Caching reports in SQLite"
            );
            Ok(Arc::new(
                CachedProvider::new(provider, Arc::new(cache)).with_ttl(config.cache_ttl()),
            ))
        }
        None => Ok(provider),
    }
}

#[cfg(not(feature = "cache-sqlite"))]
fn with_report_cache(
    provider: Arc<dyn DisclosureProvider>,
    config: &DartConfig,
) -> Result<Arc<dyn DisclosureProvider>> {
    if let Some(path) = config.cache_path() {
        tracing::warn!(
            path = %path.display(),
            "Report cache requested but the cache-sqlite feature is disabled"
        );
    }
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let err = DartTools::from_config(&DartConfig::default()).unwrap_err();
        assert!(matches!(err, DartError::ProviderNotConfigured(_)));
    }

    #[test]
    fn test_from_config_builds() {
        let dir = tempfile::tempdir().unwrap();
        let config = DartConfig::new("key")
            .with_corp_code_path(dir.path().join("corpcode.json"))
            .with_cache_path(dir.path().join("reports.db"));
        let tools = DartTools::from_config(&config).unwrap();
        assert!(format!("{tools:?}").contains("opendart"));
    }

    #[test]
    fn test_fixed_today_anchors_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        let tools = DartTools::from_config(
            &DartConfig::new("key").with_corp_code_path(dir.path().join("corpcode.json")),
        )
        .unwrap()
        .with_today(today);
        assert_eq!(tools.resolver().today(), today);
    }
}
