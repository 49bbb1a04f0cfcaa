//! Provider traits for fetching disclosure data.
//!
//! This module defines the collaborator seams the lookup engine depends on:
//!
//! - [`DisclosureProvider`] - Fetches one report category for one company and period
//! - [`CorpCodeResolver`] - Maps tickers and company names to DART corp codes

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    period::Period,
    types::{CorpCode, Record, ReportCategory},
};

/// Source of disclosure reports.
///
/// Implementations return an empty vector when no filing exists for the
/// company and period, and an error only when the call itself failed.
#[async_trait]
pub trait DisclosureProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "opendart").
    fn name(&self) -> &str;

    /// Fetches the records of one report category.
    async fn fetch_report(
        &self,
        category: ReportCategory,
        corp_code: &CorpCode,
        period: Period,
    ) -> Result<Vec<Record>>;
}

/// Resolver from caller-facing identifiers to DART corp codes.
#[async_trait]
pub trait CorpCodeResolver: Send + Sync + Debug {
    /// Populates the identifier table if that has not happened yet.
    ///
    /// Idempotent: once the table is loaded, later calls return immediately.
    async fn ensure_initialized(&self) -> Result<()>;

    /// Resolves a 6-digit ticker (optionally suffixed with `.KS` or `.KQ`) or a
    /// company name to its corp code.
    ///
    /// Fails with [`DartError::CorpNotFound`](crate::DartError::CorpNotFound) if
    /// nothing matches.
    async fn fetch_corp_code(&self, identifier: &str) -> Result<CorpCode>;
}
