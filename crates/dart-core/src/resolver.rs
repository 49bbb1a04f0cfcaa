//! Period resolution with backward fallback, and category aggregation.
//!
//! Filings lag the calendar by up to a full reporting cycle. When a caller asks
//! for the latest data without naming a period, [`PeriodResolver`] starts at the
//! most recently closed quarter and walks backward one quarter at a time until a
//! filing turns up or [`MAX_ATTEMPTS`] fetches have been made. An explicit
//! period is always answered from that period alone.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::{
    error::Result,
    period::{Period, PeriodRequest},
    provider::DisclosureProvider,
    types::{CorpCode, Record, ReportCategory},
};

/// Maximum number of fetches made per category for one lookup.
pub const MAX_ATTEMPTS: u32 = 4;

/// A fetch function bound to one report category.
#[async_trait]
pub trait CategoryFetcher: Send + Sync {
    /// The category this fetcher retrieves.
    fn category(&self) -> ReportCategory;

    /// Fetches the category's records for a company and period.
    ///
    /// An empty vector means no filing exists; an error means the fetch failed.
    async fn fetch(&self, corp_code: &CorpCode, period: Period) -> Result<Vec<Record>>;
}

/// [`CategoryFetcher`] that delegates to a [`DisclosureProvider`].
#[derive(Debug, Clone, Copy)]
pub struct ProviderFetcher<'a> {
    provider: &'a dyn DisclosureProvider,
    category: ReportCategory,
}

impl<'a> ProviderFetcher<'a> {
    /// Binds a provider to one report category.
    #[must_use]
    pub const fn new(provider: &'a dyn DisclosureProvider, category: ReportCategory) -> Self {
        Self { provider, category }
    }
}

#[async_trait]
impl CategoryFetcher for ProviderFetcher<'_> {
    fn category(&self) -> ReportCategory {
        self.category
    }

    async fn fetch(&self, corp_code: &CorpCode, period: Period) -> Result<Vec<Record>> {
        self.provider
            .fetch_report(self.category, corp_code, period)
            .await
    }
}

/// Outcome of resolving one category.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The period whose result was kept.
    pub period: Period,
    /// Records returned for that period; empty if nothing was found.
    pub records: Vec<Record>,
    /// Number of fetches made.
    pub attempts: u32,
}

/// Resolves which fiscal period to answer a lookup from.
///
/// The resolver is anchored to a calendar date, which decides the default
/// period for requests that omit the year or the quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodResolver {
    today: NaiveDate,
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodResolver {
    /// Creates a resolver anchored to the local current date.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Local::now().date_naive())
    }

    /// Creates a resolver anchored to a fixed date.
    #[must_use]
    pub const fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Returns the date this resolver is anchored to.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Resolves one category.
    ///
    /// Fetches strictly one period at a time. A fetch error is returned as-is
    /// and never triggers a step back to an earlier period.
    ///
    /// # Errors
    /// Propagates the first error returned by `fetcher`.
    pub async fn resolve(
        &self,
        corp_code: &CorpCode,
        request: PeriodRequest,
        fetcher: &dyn CategoryFetcher,
    ) -> Result<Resolution> {
        let explicit = request.is_explicit();
        let category = fetcher.category();
        let mut period = request.starting_period(self.today);
        let mut attempt = 1;

        loop {
            debug!(
                category = %category,
                corp_code = %corp_code,
                period = %period,
                attempt,
                "Fetching report"
            );

            let records = fetcher
                .fetch(corp_code, period)
                .await
                .inspect_err(|e| {
                    warn!(
                        category = %category,
                        period = %period,
                        error = %e,
                        "Report fetch failed"
                    );
                })?;

            if explicit || !records.is_empty() || attempt >= MAX_ATTEMPTS {
                debug!(
                    category = %category,
                    period = %period,
                    count = records.len(),
                    attempts = attempt,
                    "Resolved report period"
                );
                return Ok(Resolution {
                    period,
                    records,
                    attempts: attempt,
                });
            }

            period = period.previous();
            attempt += 1;
        }
    }

    /// Resolves each category independently and concatenates their records
    /// in the order the fetchers are given.
    ///
    /// Every category starts from the same request; one category's fallback
    /// never shifts the starting period of the next.
    ///
    /// # Errors
    /// Propagates the first fetch error; later categories are not attempted.
    pub async fn aggregate(
        &self,
        corp_code: &CorpCode,
        request: PeriodRequest,
        fetchers: &[&dyn CategoryFetcher],
    ) -> Result<Vec<Record>> {
        let mut outputs = Vec::new();
        for fetcher in fetchers {
            let resolution = self.resolve(corp_code, request, *fetcher).await?;
            outputs.extend(resolution.records);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DartError;
    use crate::period::Quarter;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fetcher answering from a fixed table and recording every call.
    struct ScriptedFetcher {
        category: ReportCategory,
        data: HashMap<Period, Vec<Record>>,
        failing: Option<Period>,
        calls: Mutex<Vec<Period>>,
    }

    impl ScriptedFetcher {
        fn new(category: ReportCategory) -> Self {
            Self {
                category,
                data: HashMap::new(),
                failing: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, period: Period, count: usize, tag: &str) -> Self {
            let records = (0..count)
                .map(|i| Record::new().with_field("tag", tag).with_field("row", i))
                .collect();
            self.data.insert(period, records);
            self
        }

        fn failing_at(mut self, period: Period) -> Self {
            self.failing = Some(period);
            self
        }

        fn calls(&self) -> Vec<Period> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CategoryFetcher for ScriptedFetcher {
        fn category(&self) -> ReportCategory {
            self.category
        }

        async fn fetch(&self, _corp_code: &CorpCode, period: Period) -> Result<Vec<Record>> {
            self.calls.lock().unwrap().push(period);
            if self.failing == Some(period) {
                return Err(DartError::Network("connection reset".into()));
            }
            Ok(self.data.get(&period).cloned().unwrap_or_default())
        }
    }

    fn p(year: i32, quarter: u8) -> Period {
        Period::new(year, Quarter::try_from(quarter).unwrap())
    }

    fn may_2025() -> PeriodResolver {
        PeriodResolver::at(NaiveDate::from_ymd_opt(2025, 5, 15).unwrap())
    }

    fn code() -> CorpCode {
        CorpCode::new("00126380")
    }

    #[tokio::test]
    async fn test_explicit_period_single_fetch() {
        let fetcher =
            ScriptedFetcher::new(ReportCategory::FinancialStatements).with(p(2024, 4), 3, "fs");
        let request = PeriodRequest::exact(p(2024, 4));

        let resolution = may_2025().resolve(&code(), request, &fetcher).await.unwrap();

        assert_eq!(resolution.period, p(2024, 4));
        assert_eq!(resolution.records.len(), 3);
        assert_eq!(fetcher.calls(), vec![p(2024, 4)]);
    }

    #[tokio::test]
    async fn test_explicit_empty_period_is_final() {
        let fetcher =
            ScriptedFetcher::new(ReportCategory::Dividends).with(p(2024, 3), 2, "earlier");
        let request = PeriodRequest::exact(p(2024, 4));

        let resolution = may_2025().resolve(&code(), request, &fetcher).await.unwrap();

        assert!(resolution.records.is_empty());
        assert_eq!(resolution.period, p(2024, 4));
        assert_eq!(resolution.attempts, 1);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_implicit_always_empty_makes_four_fetches() {
        let fetcher = ScriptedFetcher::new(ReportCategory::Dividends);

        let resolution = may_2025()
            .resolve(&code(), PeriodRequest::latest(), &fetcher)
            .await
            .unwrap();

        let calls = fetcher.calls();
        assert_eq!(calls, vec![p(2025, 1), p(2024, 4), p(2024, 3), p(2024, 2)]);
        assert!(calls.windows(2).all(|w| w[1] < w[0]));
        assert!(calls.windows(2).all(|w| w[0].previous() == w[1]));
        assert!(resolution.records.is_empty());
        assert_eq!(resolution.period, p(2024, 2));
        assert_eq!(resolution.attempts, MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_implicit_stops_at_first_non_empty() {
        let fetcher = ScriptedFetcher::new(ReportCategory::FinancialStatements)
            .with(p(2024, 3), 2, "q3")
            .with(p(2024, 2), 5, "q2");

        let resolution = may_2025()
            .resolve(&code(), PeriodRequest::latest(), &fetcher)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), vec![p(2025, 1), p(2024, 4), p(2024, 3)]);
        assert_eq!(resolution.period, p(2024, 3));
        assert_eq!(resolution.records.len(), 2);
        assert_eq!(resolution.attempts, 3);
    }

    #[tokio::test]
    async fn test_data_beyond_four_quarters_is_not_reached() {
        let fetcher =
            ScriptedFetcher::new(ReportCategory::Dividends).with(p(2024, 1), 1, "too-old");

        let resolution = may_2025()
            .resolve(&code(), PeriodRequest::latest(), &fetcher)
            .await
            .unwrap();

        assert!(resolution.records.is_empty());
        assert_eq!(fetcher.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_first_quarter_default_starts_at_prior_annual() {
        let resolver = PeriodResolver::at(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        let fetcher = ScriptedFetcher::new(ReportCategory::Dividends).with(p(2025, 4), 1, "a");

        let resolution = resolver
            .resolve(&code(), PeriodRequest::latest(), &fetcher)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), vec![p(2025, 4)]);
        assert_eq!(resolution.period, p(2025, 4));
    }

    #[tokio::test]
    async fn test_year_only_request_falls_back() {
        let fetcher =
            ScriptedFetcher::new(ReportCategory::FinancialStatements).with(p(2023, 2), 1, "h1");
        let request = PeriodRequest::from_parts(Some(2023), None).unwrap();

        let resolution = may_2025().resolve(&code(), request, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls(), vec![p(2023, 4), p(2023, 3), p(2023, 2)]);
        assert_eq!(resolution.period, p(2023, 2));
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_retried() {
        let fetcher = ScriptedFetcher::new(ReportCategory::Dividends)
            .with(p(2024, 3), 2, "never")
            .failing_at(p(2024, 4));

        let err = may_2025()
            .resolve(&code(), PeriodRequest::latest(), &fetcher)
            .await
            .unwrap_err();

        assert!(matches!(err, DartError::Network(_)));
        assert_eq!(fetcher.calls(), vec![p(2025, 1), p(2024, 4)]);
    }

    #[tokio::test]
    async fn test_aggregate_preserves_category_order() {
        // Each category lands on a different period.
        let individual = ScriptedFetcher::new(ReportCategory::DirectorCompensation)
            .with(p(2024, 4), 2, "individual");
        let total = ScriptedFetcher::new(ReportCategory::TotalDirectorCompensation)
            .with(p(2025, 1), 1, "total");
        let top5 = ScriptedFetcher::new(ReportCategory::Top5DirectorCompensation)
            .with(p(2024, 2), 3, "top5");

        let fetchers: [&dyn CategoryFetcher; 3] = [&individual, &total, &top5];
        let records = may_2025()
            .aggregate(&code(), PeriodRequest::latest(), &fetchers)
            .await
            .unwrap();

        let tags: Vec<_> = records.iter().filter_map(|r| r.get_str("tag")).collect();
        assert_eq!(
            tags,
            vec!["individual", "individual", "total", "top5", "top5", "top5"]
        );

        // The second category starts from the requested period, not where the
        // first one stopped.
        assert_eq!(individual.calls(), vec![p(2025, 1), p(2024, 4)]);
        assert_eq!(total.calls(), vec![p(2025, 1)]);
        assert_eq!(top5.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_aggregate_stops_on_error() {
        let first = ScriptedFetcher::new(ReportCategory::DirectorCompensation)
            .failing_at(p(2024, 4));
        let second = ScriptedFetcher::new(ReportCategory::TotalDirectorCompensation);

        let fetchers: [&dyn CategoryFetcher; 2] = [&first, &second];
        let result = may_2025()
            .aggregate(&code(), PeriodRequest::latest(), &fetchers)
            .await;

        assert!(result.is_err());
        assert!(second.calls().is_empty());
    }
}
