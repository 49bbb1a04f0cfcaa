#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Disclosure lookup tools for DART.
//!
//! This crate re-exports the core types and wires the corp-code registry, the
//! OpenDART provider and an optional report cache into [`DartTools`].

// Core types and traits
pub use dart_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use dart_cache::SqliteReportCache;
pub use dart_cache::{InMemoryReportCache, NoopReportCache};

// Corp codes and providers
pub use dart_corpcode::{CorpCodeRegistry, CorpEntry, JsonFileSource, StaticSource};
pub use dart_opendart::{OpenDartCorpCodeSource, OpenDartProvider, StatementDivision};

mod cached;
pub use cached::CachedProvider;

mod config;
pub use config::DartConfig;

pub mod prompts;

mod tools;
pub use tools::DartTools;
