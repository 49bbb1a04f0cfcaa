#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenDART data provider for periodic-report disclosures.
//!
//! This crate implements [`DisclosureProvider`] for the OpenDART API operated by
//! the Financial Supervisory Service:
//!
//! - Full single-company financial statements
//! - Dividend matters
//! - Director and auditor compensation (individual, total, top five)
//!
//! # Example
//!
//! ```no_run
//! use dart_core::{CorpCode, DisclosureProvider, Period, Quarter, ReportCategory};
//! use dart_opendart::OpenDartProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenDartProvider::new("your-api-key");
//!
//!     let samsung = CorpCode::new("00126380");
//!     let records = provider
//!         .fetch_report(ReportCategory::Dividends, &samsung, Period::new(2024, Quarter::Q4))
//!         .await?;
//!     println!("{} dividend rows", records.len());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use dart_core::{
    CorpCode, DartError, DisclosureProvider, Period, Quarter, Record, ReportCategory, Result,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

mod corp_codes;
pub use corp_codes::OpenDartCorpCodeSource;

/// OpenDART API base URL
const OPENDART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Default minimum spacing between requests
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Filings can take tens of seconds to assemble on the provider side
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Name reported by [`DisclosureProvider::name`].
const PROVIDER_NAME: &str = "opendart";

/// Rate limiter to keep requests spaced out
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Which set of financial statements to request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatementDivision {
    /// Consolidated statements (`CFS`).
    #[default]
    Consolidated,
    /// Separate (parent-only) statements (`OFS`).
    Separate,
}

impl StatementDivision {
    /// Returns the OpenDART `fs_div` value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }
}

impl FromStr for StatementDivision {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CFS" => Ok(Self::Consolidated),
            "OFS" => Ok(Self::Separate),
            other => Err(DartError::InvalidParameter(format!(
                "statement division must be CFS or OFS, got {other}"
            ))),
        }
    }
}

/// Returns the OpenDART report code (`reprt_code`) for a quarter.
#[must_use]
pub const fn report_code(quarter: Quarter) -> &'static str {
    match quarter {
        Quarter::Q1 => "11013",
        Quarter::Q2 => "11012",
        Quarter::Q3 => "11014",
        Quarter::Q4 => "11011",
    }
}

/// Returns the OpenDART endpoint serving a report category.
#[must_use]
pub const fn endpoint(category: ReportCategory) -> &'static str {
    match category {
        ReportCategory::FinancialStatements => "fnlttSinglAcntAll.json",
        ReportCategory::Dividends => "alotMatter.json",
        ReportCategory::DirectorCompensation => "hmvAuditIndvdlBySttus.json",
        ReportCategory::TotalDirectorCompensation => "hmvAuditAllSttus.json",
        ReportCategory::Top5DirectorCompensation => "indvdlByPay.json",
    }
}

/// OpenDART data provider.
///
/// Implements rate limiting with a minimum interval between requests so
/// bursts of period fallbacks do not trip the service's quota.
#[derive(Clone)]
pub struct OpenDartProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    fs_div: StatementDivision,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl fmt::Debug for OpenDartProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenDartProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("fs_div", &self.fs_div)
            .finish()
    }
}

impl OpenDartProvider {
    /// Create a new OpenDART provider with the given API key (`crtfc_key`).
    ///
    /// # Example
    /// ```
    /// use dart_opendart::OpenDartProvider;
    ///
    /// let provider = OpenDartProvider::new("your-api-key");
    /// ```
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, api_key)
    }

    /// Create a new OpenDART provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENDART_BASE_URL.to_string(),
            fs_div: StatementDivision::default(),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Selects consolidated or separate financial statements.
    #[must_use]
    pub const fn with_statement_division(mut self, fs_div: StatementDivision) -> Self {
        self.fs_div = fs_div;
        self
    }

    /// Overrides the minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// A corp-code source sharing this provider's client, key and base URL.
    #[must_use]
    pub fn corp_code_source(&self) -> OpenDartCorpCodeSource {
        OpenDartCorpCodeSource::with_client(self.client.clone(), self.api_key.clone())
            .with_base_url(self.base_url.clone())
    }

    /// Builds the query string for one report request.
    fn query(
        &self,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("crtfc_key", self.api_key.clone()),
            ("corp_code", corp_code.to_string()),
            ("bsns_year", period.year.to_string()),
            ("reprt_code", report_code(period.quarter).to_string()),
        ];
        if category == ReportCategory::FinancialStatements {
            query.push(("fs_div", self.fs_div.as_str().to_string()));
        }
        query
    }
}

#[async_trait]
impl DisclosureProvider for OpenDartProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_report(
        &self,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Vec<Record>> {
        if self.api_key.is_empty() {
            return Err(DartError::ProviderNotConfigured(
                "OpenDART API key is empty".to_string(),
            ));
        }

        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/{}", self.base_url, endpoint(category));
        debug!(
            category = %category,
            corp_code = %corp_code,
            period = %period,
            "Fetching {}",
            url
        );

        let response = self
            .client
            .get(&url)
            .query(&self.query(category, corp_code, period))
            .send()
            .await
            .map_err(|e| DartError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DartError::Network(format!(
                "Failed to fetch {} for {}: HTTP {}",
                category,
                corp_code,
                response.status()
            )));
        }

        let body: ApiResponse = response.json().await.map_err(|e| {
            DartError::Parse(format!("Failed to parse {} response: {}", category, e))
        })?;

        let records = body.into_records(category)?;
        debug!(
            category = %category,
            report = category.display_name(),
            count = records.len(),
            "Fetched report"
        );
        Ok(records)
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Envelope shared by every OpenDART JSON endpoint.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    /// Status code; "000" on success
    status: String,
    /// Human-readable status message
    #[serde(default)]
    message: String,
    /// Result rows
    #[serde(default)]
    list: Vec<Map<String, Value>>,
}

impl ApiResponse {
    /// Maps the status to records, an empty result, or an error.
    fn into_records(self, category: ReportCategory) -> Result<Vec<Record>> {
        match self.status.as_str() {
            "000" => Ok(self
                .list
                .into_iter()
                .map(|row| {
                    let mut record = Record::from(row);
                    record.insert("category", category.as_str());
                    record
                })
                .collect()),
            // 조회된 데이타가 없습니다.
            "013" => Ok(Vec::new()),
            _ => Err(status_error(self.status, self.message)),
        }
    }
}

/// Maps an OpenDART failure status to an error.
fn status_error(status: String, message: String) -> DartError {
    match status.as_str() {
        "010" | "011" | "012" | "901" => {
            DartError::AuthenticationFailed(format!("{PROVIDER_NAME}: {message}"))
        }
        "020" => DartError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: None,
        },
        "100" | "101" => DartError::InvalidParameter(message),
        _ => DartError::Api { status, message },
    }
}

// =============================================================================
// Tests
// =============================================================================
