#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! DART corp-code lookup.
//!
//! This crate implements [`CorpCodeResolver`](dart_core::CorpCodeResolver):
//!
//! - [`CorpCodeTable`] - Ticker and company-name index over [`CorpEntry`] rows
//! - [`CorpCodeSource`] - Where entries come from on first load
//! - [`CorpCodeRegistry`] - One-time, persisted initialization of the table
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dart_core::CorpCodeResolver;
//! use dart_corpcode::{CorpCodeRegistry, JsonFileSource};
//!
//! # async fn example() -> dart_core::Result<()> {
//! let registry = CorpCodeRegistry::new(Arc::new(JsonFileSource::new("listing.json")))
//!     .with_cache_path("corpcode.json");
//!
//! registry.ensure_initialized().await?;
//! let code = registry.fetch_corp_code("005930.KS").await?;
//! println!("Samsung Electronics: {code}");
//! # Ok(())
//! # }
//! ```

/// Process-wide registry with one-time initialization.
pub mod registry;
/// Entry sources.
pub mod source;
/// In-memory lookup table.
pub mod table;

pub use registry::CorpCodeRegistry;
pub use source::{CorpCodeSource, JsonFileSource, StaticSource};
pub use table::{CorpCodeTable, CorpEntry, Identifier};
