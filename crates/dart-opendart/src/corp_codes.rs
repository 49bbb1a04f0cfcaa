//! The OpenDART corp-code listing (`corpCode.xml`).
//!
//! OpenDART publishes every registered company as one zipped XML document:
//!
//! ```xml
//! <result>
//!     <list>
//!         <corp_code>00126380</corp_code>
//!         <corp_name>삼성전자</corp_name>
//!         <stock_code>005930</stock_code>
//!         <modify_date>20240101</modify_date>
//!     </list>
//! </result>
//! ```
//!
//! Failures are answered with an unzipped `<result>` carrying `status` and `message`.

use async_trait::async_trait;
use dart_core::{DartError, Result};
use dart_corpcode::{CorpCodeSource, CorpEntry};
use serde::Deserialize;
use std::fmt;
use std::io::{Cursor, Read};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::{DEFAULT_TIMEOUT, OPENDART_BASE_URL, status_error};

/// Endpoint serving the zipped listing.
const CORP_CODE_ENDPOINT: &str = "corpCode.xml";

/// Local file header signature that opens every zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// [`CorpCodeSource`] that downloads the full listing from OpenDART.
///
/// Used by [`CorpCodeRegistry`](dart_corpcode::CorpCodeRegistry) on first
/// initialization, after which the persisted table is read instead.
#[derive(Clone)]
pub struct OpenDartCorpCodeSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for OpenDartCorpCodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenDartCorpCodeSource")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenDartCorpCodeSource {
    /// Create a source with the given API key (`crtfc_key`).
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, api_key)
    }

    /// Create a source with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENDART_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CorpCodeSource for OpenDartCorpCodeSource {
    fn name(&self) -> &str {
        "opendart"
    }

    async fn load_entries(&self) -> Result<Vec<CorpEntry>> {
        if self.api_key.is_empty() {
            return Err(DartError::ProviderNotConfigured(
                "OpenDART API key is empty".to_string(),
            ));
        }

        let url = format!("{}/{}", self.base_url, CORP_CODE_ENDPOINT);
        debug!("Downloading corp-code listing from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DartError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DartError::Network(format!(
                "Failed to fetch corp-code listing: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DartError::Network(e.to_string()))?;

        // Unzipping and parsing roughly 100k companies is CPU-bound.
        let entries = tokio::task::spawn_blocking(move || parse_listing(&body))
            .await
            .map_err(|e| DartError::Other(format!("corp-code parser panicked: {}", e)))??;

        info!(companies = entries.len(), "Downloaded corp-code listing");
        Ok(entries)
    }
}

// =============================================================================
// Listing format
// =============================================================================

/// `<result>` document, either the listing or a status reply.
#[derive(Debug, Deserialize)]
struct CorpCodeDocument {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    list: Vec<CorpCodeRow>,
}

/// One `<list>` element.
#[derive(Debug, Deserialize)]
struct CorpCodeRow {
    corp_code: String,
    corp_name: String,
    #[serde(default)]
    stock_code: String,
    #[serde(default)]
    modify_date: String,
}

impl From<CorpCodeRow> for CorpEntry {
    fn from(row: CorpCodeRow) -> Self {
        let non_blank = |s: String| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            corp_code: row.corp_code.trim().to_string(),
            corp_name: row.corp_name.trim().to_string(),
            stock_code: non_blank(row.stock_code),
            modify_date: non_blank(row.modify_date),
        }
    }
}

/// Parses the body of a `corpCode.xml` response.
fn parse_listing(body: &[u8]) -> Result<Vec<CorpEntry>> {
    if !body.starts_with(ZIP_MAGIC) {
        let text = String::from_utf8_lossy(body);
        let document = parse_document(&text)?;
        return match (document.status, document.message) {
            (Some(status), message) if status != "000" => {
                Err(status_error(status, message.unwrap_or_default()))
            }
            _ => Err(DartError::Parse(
                "corp-code listing is not a zip archive".to_string(),
            )),
        };
    }

    let mut archive = ZipArchive::new(Cursor::new(body))
        .map_err(|e| DartError::Parse(format!("corp-code archive: {}", e)))?;
    if archive.is_empty() {
        return Err(DartError::Parse("corp-code archive is empty".to_string()));
    }

    let mut xml = String::new();
    archive
        .by_index(0)
        .map_err(|e| DartError::Parse(format!("corp-code archive: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| DartError::Parse(format!("corp-code archive: {}", e)))?;

    let document = parse_document(&xml)?;
    Ok(document.list.into_iter().map(CorpEntry::from).collect())
}

fn parse_document(xml: &str) -> Result<CorpCodeDocument> {
    quick_xml::de::from_str(xml)
        .map_err(|e| DartError::Parse(format!("Failed to parse corp-code listing: {}", e)))
}
