//! Process-wide corp-code registry with one-time initialization.

use async_trait::async_trait;
use dart_core::{CorpCode, CorpCodeResolver, DartError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::source::CorpCodeSource;
use crate::table::{CorpCodeTable, CorpEntry};

/// Corp-code resolver backed by a lazily loaded [`CorpCodeTable`].
///
/// The table is loaded at most once. Concurrent first callers wait on the same
/// initialization, so the persisted file is never written twice. A failed
/// initialization is not remembered; the next call tries again.
#[derive(Debug)]
pub struct CorpCodeRegistry {
    source: Arc<dyn CorpCodeSource>,
    cache_path: Option<PathBuf>,
    table: OnceCell<CorpCodeTable>,
}

impl CorpCodeRegistry {
    /// Creates a registry that loads from `source` and keeps the table in memory only.
    #[must_use]
    pub fn new(source: Arc<dyn CorpCodeSource>) -> Self {
        Self {
            source,
            cache_path: None,
            table: OnceCell::new(),
        }
    }

    /// Persists the table to `path` and prefers that file over the source.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Returns true once the table has been loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.table.initialized()
    }

    /// Looks up a company's name from its corp code.
    ///
    /// # Errors
    /// Returns [`DartError::CorpNotFound`] for an unknown code, or the
    /// initialization error if the table cannot be loaded.
    pub async fn fetch_corp_name(&self, corp_code: &CorpCode) -> Result<String> {
        let table = self.table().await?;
        table
            .by_corp_code(corp_code)
            .map(|entry| entry.corp_name.clone())
            .ok_or_else(|| DartError::CorpNotFound(corp_code.to_string()))
    }

    /// Returns the loaded table, loading it first if necessary.
    ///
    /// # Errors
    /// Returns [`DartError::Initialization`] if the table cannot be loaded or persisted.
    pub async fn table(&self) -> Result<&CorpCodeTable> {
        self.table.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<CorpCodeTable> {
        if let Some(path) = &self.cache_path {
            match read_persisted(path).await {
                Ok(Some(entries)) => {
                    info!(
                        path = %path.display(),
                        companies = entries.len(),
                        "Loaded corp-code table from disk"
                    );
                    return Ok(CorpCodeTable::from_entries(entries));
                }
                Ok(None) => {
                    debug!(path = %path.display(), "No persisted corp-code table");
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unreadable corp-code table"
                    );
                }
            }
        }

        let entries = self
            .source
            .load_entries()
            .await
            .map_err(|e| match e {
                DartError::Initialization(_) => e,
                other => DartError::Initialization(format!(
                    "source {} failed: {}",
                    self.source.name(),
                    other
                )),
            })?;

        if entries.is_empty() {
            return Err(DartError::Initialization(format!(
                "source {} returned no companies",
                self.source.name()
            )));
        }

        if let Some(path) = &self.cache_path {
            persist(path, &entries).await?;
            info!(
                path = %path.display(),
                companies = entries.len(),
                "Saved corp-code table"
            );
        }

        Ok(CorpCodeTable::from_entries(entries))
    }
}

#[async_trait]
impl CorpCodeResolver for CorpCodeRegistry {
    async fn ensure_initialized(&self) -> Result<()> {
        self.table().await.map(|_| ())
    }

    async fn fetch_corp_code(&self, identifier: &str) -> Result<CorpCode> {
        let code = self.table().await?.corp_code(identifier)?;
        debug!(identifier, corp_code = %code, "Resolved corp code");
        Ok(code)
    }
}

/// Reads a persisted table; `Ok(None)` when the file does not exist.
async fn read_persisted(path: &Path) -> Result<Option<Vec<CorpEntry>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DartError::Initialization(e.to_string())),
    };
    let entries: Vec<CorpEntry> =
        serde_json::from_slice(&bytes).map_err(|e| DartError::Parse(e.to_string()))?;
    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(entries))
}

/// Writes the table next to its final location, then renames it into place.
async fn persist(path: &Path, entries: &[CorpEntry]) -> Result<()> {
    let json = serde_json::to_vec(entries)
        .map_err(|e| DartError::Initialization(format!("serialize corp codes: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DartError::Initialization(format!("{}: {}", parent.display(), e)))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| DartError::Initialization(format!("{}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DartError::Initialization(format!("{}: {}", path.display(), e)))?;
    Ok(())
}
