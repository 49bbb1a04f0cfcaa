#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for DART disclosure reports.
//!
//! This crate provides implementations of the [`ReportCache`] trait from `dart-core`:
//!
//! - [`SqliteReportCache`] - Persistent SQLite-based cache (default, requires `sqlite` feature)
//! - [`InMemoryReportCache`] - Simple in-memory cache for testing
//! - [`NoopReportCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

/// SQLite-based cache implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use dart_core::ReportCache;

// Re-export implementations
pub use memory::InMemoryReportCache;
pub use noop::NoopReportCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteReportCache;
