#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for DART disclosure tools.
//!
//! This crate provides the foundational abstractions for looking up Korean
//! corporate disclosures:
//!
//! - [`DisclosureProvider`](provider::DisclosureProvider) - Fetches one report category
//! - [`CorpCodeResolver`](provider::CorpCodeResolver) - Ticker/name to corp code lookup
//! - [`ReportCache`](cache::ReportCache) - Caching abstraction
//! - [`PeriodResolver`](resolver::PeriodResolver) - Period fallback and category aggregation

/// Cache trait for storing fetched reports.
pub mod cache;
/// Error types for disclosure operations.
pub mod error;
/// Fiscal period definitions.
pub mod period;
/// Provider traits for fetching disclosure data.
pub mod provider;
/// Period resolution and category aggregation.
pub mod resolver;
/// Core data types (CorpCode, Record, ReportCategory).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::ReportCache;
pub use error::{DartError, ErrorKind, Result};
pub use period::{Period, PeriodRequest, Quarter};
pub use provider::{CorpCodeResolver, DisclosureProvider};
pub use resolver::{CategoryFetcher, MAX_ATTEMPTS, PeriodResolver, ProviderFetcher, Resolution};
pub use types::{CorpCode, Record, ReportCategory};
