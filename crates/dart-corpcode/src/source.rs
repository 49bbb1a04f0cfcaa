//! Sources that supply corp-code entries on first initialization.

use async_trait::async_trait;
use dart_core::{DartError, Result};
use std::fmt::Debug;
use std::path::PathBuf;
use tracing::debug;

use crate::table::CorpEntry;

/// Supplier of the full company list.
#[async_trait]
pub trait CorpCodeSource: Send + Sync + Debug {
    /// Returns the name of this source, for logging.
    fn name(&self) -> &str;

    /// Loads every company entry.
    async fn load_entries(&self) -> Result<Vec<CorpEntry>>;
}

/// Reads entries from a JSON array on disk.
///
/// The expected shape is the one [`CorpCodeRegistry`](crate::CorpCodeRegistry)
/// persists: `[{"corp_code": "...", "corp_name": "...", "stock_code": "..."}]`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CorpCodeSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn load_entries(&self) -> Result<Vec<CorpEntry>> {
        debug!(path = %self.path.display(), "Reading corp-code listing");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            DartError::Initialization(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            DartError::Parse(format!(
                "Failed to parse corp-code listing {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Serves a fixed list of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: Vec<CorpEntry>,
}

impl StaticSource {
    /// Creates a source over the given entries.
    #[must_use]
    pub const fn new(entries: Vec<CorpEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CorpCodeSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn load_entries(&self) -> Result<Vec<CorpEntry>> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.json");
        std::fs::write(
            &path,
            r#"[{"corp_code":"00126380","corp_name":"삼성전자","stock_code":"005930","modify_date":"20240101"},
                {"corp_code":"00434003","corp_name":"다코"}]"#,
        )
        .unwrap();

        let entries = JsonFileSource::new(&path).load_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].listed_stock_code(), Some("005930"));
        assert_eq!(entries[1].stock_code, None);
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileSource::new(dir.path().join("absent.json"))
            .load_entries()
            .await
            .unwrap_err();
        assert!(matches!(err, DartError::Initialization(_)));
    }

    #[tokio::test]
    async fn test_json_file_source_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileSource::new(&path).load_entries().await.unwrap_err();
        assert!(matches!(err, DartError::Parse(_)));
    }
}
