//! Runtime configuration for the disclosure tools.

use std::fmt;
use std::path::{Path, PathBuf};

use std::sync::Arc;
use std::time::Duration;

use dart_core::{DartError, Result};
use dart_corpcode::{CorpCodeRegistry, CorpCodeSource, JsonFileSource};
use dart_opendart::{OpenDartCorpCodeSource, StatementDivision};

/// Environment variable holding the OpenDART API key.
const ENV_API_KEY: &str = "DART_API_KEY";
/// Environment variable naming the persisted corp-code table.
const ENV_CORPCODE_PATH: &str = "DART_CORPCODE_PATH";
/// Environment variable naming the listing the table is built from.
const ENV_CORP_LISTING: &str = "DART_CORP_LISTING";
/// Environment variable naming the SQLite report cache.
const ENV_CACHE_PATH: &str = "DART_CACHE_PATH";
/// Environment variable holding the report cache lifetime in seconds.
const ENV_CACHE_TTL: &str = "DART_CACHE_TTL";
/// Environment variable selecting consolidated or separate statements.
const ENV_FS_DIV: &str = "DART_FS_DIV";

/// Default location of the persisted corp-code table.
const DEFAULT_CORPCODE_PATH: &str = "corpcode.json";

/// Default lifetime of a cached report.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Settings used to build [`DartTools`](crate::DartTools).
#[derive(Clone, PartialEq, Eq)]
pub struct DartConfig {
    api_key: Option<String>,
    corp_code_path: PathBuf,
    corp_listing_path: Option<PathBuf>,
    cache_path: Option<PathBuf>,
    cache_ttl: Duration,
    statement_division: StatementDivision,
}

impl fmt::Debug for DartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DartConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("corp_code_path", &self.corp_code_path)
            .field("corp_listing_path", &self.corp_listing_path)
            .field("cache_path", &self.cache_path)
            .field("cache_ttl", &self.cache_ttl)
            .field("statement_division", &self.statement_division)
            .finish()
    }
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            corp_code_path: PathBuf::from(DEFAULT_CORPCODE_PATH),
            corp_listing_path: None,
            cache_path: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            statement_division: StatementDivision::default(),
        }
    }
}

impl DartConfig {
    /// Create a configuration with the given API key and default paths.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(api_key)
    }

    /// Read the configuration from `DART_*` environment variables.
    ///
    /// # Errors
    /// Returns [`DartError::InvalidParameter`](dart_core::DartError::InvalidParameter)
    /// if `DART_FS_DIV` is set to something other than `CFS` or `OFS`, or if
    /// `DART_CACHE_TTL` is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable lookup. Blank values count as unset.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(key) = var(ENV_API_KEY) {
            config.api_key = Some(key.trim().to_string());
        }
        if let Some(path) = var(ENV_CORPCODE_PATH) {
            config.corp_code_path = PathBuf::from(path);
        }
        config.corp_listing_path = var(ENV_CORP_LISTING).map(PathBuf::from);
        config.cache_path = var(ENV_CACHE_PATH).map(PathBuf::from);
        if let Some(ttl) = var(ENV_CACHE_TTL) {
            let seconds = ttl.trim().parse::<u64>().map_err(|e| {
                DartError::InvalidParameter(format!(
                    "{ENV_CACHE_TTL} must be a number of seconds, got {ttl}: {e}"
                ))
            })?;
            config.cache_ttl = Duration::from_secs(seconds);
        }
        if let Some(fs_div) = var(ENV_FS_DIV) {
            config.statement_division = fs_div.parse()?;
        }
        Ok(config)
    }

    /// Set the OpenDART API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set where the corp-code table is persisted.
    #[must_use]
    pub fn with_corp_code_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corp_code_path = path.into();
        self
    }

    /// Set the JSON listing the corp-code table is built from.
    #[must_use]
    pub fn with_corp_listing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corp_listing_path = Some(path.into());
        self
    }

    /// Cache fetched reports in a SQLite database at `path`.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Set how long a cached report is served before it is fetched again.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Select consolidated or separate financial statements.
    #[must_use]
    pub const fn with_statement_division(mut self, division: StatementDivision) -> Self {
        self.statement_division = division;
        self
    }

    /// The API key, if one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Where the corp-code table is persisted.
    #[must_use]
    pub fn corp_code_path(&self) -> &Path {
        &self.corp_code_path
    }

    /// The JSON listing the table is built from, if one is configured.
    ///
    /// Without one, the table is downloaded from OpenDART.
    #[must_use]
    pub fn corp_listing_path(&self) -> Option<&Path> {
        self.corp_listing_path.as_deref()
    }

    /// The SQLite report cache path, if caching is enabled.
    #[must_use]
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// How long a cached report is served before it is fetched again.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Which financial statements to request.
    #[must_use]
    pub const fn statement_division(&self) -> StatementDivision {
        self.statement_division
    }

    /// A corp-code registry persisted at [`corp_code_path`](Self::corp_code_path).
    ///
    /// On first use the table is built from the configured listing, or else
    /// downloaded from OpenDART with the API key.
    #[must_use]
    pub fn corp_code_registry(&self) -> CorpCodeRegistry {
        let source: Arc<dyn CorpCodeSource> = match &self.corp_listing_path {
            Some(path) => Arc::new(JsonFileSource::new(path.clone())),
            None => Arc::new(OpenDartCorpCodeSource::new(
                self.api_key.clone().unwrap_or_default(),
            )),
        };
        CorpCodeRegistry::new(source).with_cache_path(self.corp_code_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dart_core::{CorpCodeResolver, ErrorKind};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DartConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.corp_code_path(), Path::new("corpcode.json"));
        assert_eq!(config.corp_listing_path(), None);
        assert_eq!(config.cache_path(), None);
        assert_eq!(config.cache_ttl(), Duration::from_secs(604_800));
        assert_eq!(
            config.statement_division(),
            StatementDivision::Consolidated
        );
    }

    #[test]
    fn test_reads_variables() {
        let config = DartConfig::from_lookup(lookup(&[
            ("DART_API_KEY", " abc123 "),
            ("DART_CORPCODE_PATH", "/var/lib/dart/corpcode.json"),
            ("DART_CORP_LISTING", "/srv/listing.json"),
            ("DART_CACHE_PATH", "/var/lib/dart/reports.db"),
            ("DART_CACHE_TTL", "3600"),
            ("DART_FS_DIV", "ofs"),
        ]))
        .unwrap();

        assert_eq!(config.api_key(), Some("abc123"));
        assert_eq!(
            config.corp_code_path(),
            Path::new("/var/lib/dart/corpcode.json")
        );
        assert_eq!(
            config.corp_listing_path(),
            Some(Path::new("/srv/listing.json"))
        );
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(
            config.cache_path(),
            Some(Path::new("/var/lib/dart/reports.db"))
        );
        assert_eq!(config.statement_division(), StatementDivision::Separate);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = DartConfig::from_lookup(lookup(&[("DART_API_KEY", "  ")])).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_invalid_statement_division() {
        let err = DartConfig::from_lookup(lookup(&[("DART_FS_DIV", "XBRL")])).unwrap_err();
        assert!(matches!(err, DartError::InvalidParameter(_)));
    }

    #[test]
    fn test_invalid_cache_ttl() {
        let err = DartConfig::from_lookup(lookup(&[("DART_CACHE_TTL", "1w")])).unwrap_err();
        assert!(matches!(err, DartError::InvalidParameter(_)));
    }

    #[test]
    fn test_registry_downloads_without_listing() {
        let registry = DartConfig::new("secret-key").corp_code_registry();
        let debug = format!("{registry:?}");
        assert!(debug.contains("OpenDartCorpCodeSource"));
        assert!(!debug.contains("secret-key"));

        let registry = DartConfig::new("secret-key")
            .with_corp_listing_path("/srv/listing.json")
            .corp_code_registry();
        assert!(format!("{registry:?}").contains("JsonFileSource"));
    }

    #[tokio::test]
    async fn test_fresh_install_without_key_names_the_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DartConfig::default()
            .with_corp_code_path(dir.path().join("corpcode.json"))
            .corp_code_registry();

        let err = registry.ensure_initialized().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Initialization);
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = DartConfig::new("secret-key");
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
