//! In-memory corp-code table.

use dart_core::{CorpCode, DartError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market suffixes accepted after a 6-digit ticker.
const MARKET_SUFFIXES: [&str; 2] = ["KS", "KQ"];

/// One company in the corp-code table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpEntry {
    /// DART corp code (8 digits).
    pub corp_code: String,
    /// Registered company name.
    pub corp_name: String,
    /// Exchange ticker (6 digits); absent for unlisted companies.
    #[serde(default)]
    pub stock_code: Option<String>,
    /// Date the entry was last modified by DART (YYYYMMDD).
    #[serde(default)]
    pub modify_date: Option<String>,
}

impl CorpEntry {
    /// Creates an entry for an unlisted company.
    #[must_use]
    pub fn new(corp_code: impl Into<String>, corp_name: impl Into<String>) -> Self {
        Self {
            corp_code: corp_code.into(),
            corp_name: corp_name.into(),
            stock_code: None,
            modify_date: None,
        }
    }

    /// Sets the exchange ticker.
    #[must_use]
    pub fn with_stock_code(mut self, stock_code: impl Into<String>) -> Self {
        self.stock_code = Some(stock_code.into());
        self
    }

    /// Returns the ticker if the company is listed.
    ///
    /// DART publishes unlisted companies with a blank ticker.
    #[must_use]
    pub fn listed_stock_code(&self) -> Option<&str> {
        self.stock_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// How a caller-supplied identifier should be matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Identifier<'a> {
    /// A 6-digit ticker, suffix already stripped.
    StockCode(&'a str),
    /// A company name.
    Name(&'a str),
}

impl<'a> Identifier<'a> {
    /// Classifies an identifier.
    ///
    /// `005930`, `005930.KS` and `035720.kq` are tickers; anything else is a name.
    #[must_use]
    pub fn parse(identifier: &'a str) -> Self {
        let trimmed = identifier.trim();
        let code = match trimmed.split_once('.') {
            Some((code, suffix))
                if MARKET_SUFFIXES
                    .iter()
                    .any(|m| m.eq_ignore_ascii_case(suffix)) =>
            {
                code
            }
            _ => trimmed,
        };

        if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
            Self::StockCode(code)
        } else {
            Self::Name(trimmed)
        }
    }
}

/// Normalizes a company name for loose matching.
fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Corp-code lookup table indexed by ticker and by company name.
#[derive(Clone, Debug, Default)]
pub struct CorpCodeTable {
    entries: Vec<CorpEntry>,
    by_stock_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    by_folded_name: HashMap<String, usize>,
    by_corp_code: HashMap<String, usize>,
}

impl CorpCodeTable {
    /// Builds a table from entries.
    ///
    /// When several companies share a name, a listed company wins over an
    /// unlisted one; otherwise the first entry wins.
    #[must_use]
    pub fn from_entries(entries: Vec<CorpEntry>) -> Self {
        let mut table = Self {
            entries,
            ..Default::default()
        };

        for (idx, entry) in table.entries.iter().enumerate() {
            let listed = entry.listed_stock_code().is_some();

            if let Some(code) = entry.listed_stock_code() {
                table.by_stock_code.entry(code.to_string()).or_insert(idx);
            }
            table
                .by_corp_code
                .entry(entry.corp_code.trim().to_string())
                .or_insert(idx);

            for (index, key) in [
                (&mut table.by_name, entry.corp_name.trim().to_string()),
                (&mut table.by_folded_name, fold_name(&entry.corp_name)),
            ] {
                let replace = match index.get(&key) {
                    Some(&existing) => {
                        listed && table.entries[existing].listed_stock_code().is_none()
                    }
                    None => true,
                };
                if replace {
                    index.insert(key, idx);
                }
            }
        }

        table
    }

    /// Returns the number of companies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no companies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[CorpEntry] {
        &self.entries
    }

    /// Finds the entry for a ticker or company name.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&CorpEntry> {
        let idx = match Identifier::parse(identifier) {
            Identifier::StockCode(code) => self.by_stock_code.get(code),
            Identifier::Name(name) => self
                .by_name
                .get(name)
                .or_else(|| self.by_folded_name.get(&fold_name(name))),
        }?;
        self.entries.get(*idx)
    }

    /// Resolves a ticker or company name to its corp code.
    ///
    /// # Errors
    /// Returns [`DartError::CorpNotFound`] if nothing matches.
    pub fn corp_code(&self, identifier: &str) -> Result<CorpCode> {
        self.find(identifier)
            .map(|entry| CorpCode::new(entry.corp_code.as_str()))
            .ok_or_else(|| DartError::CorpNotFound(identifier.trim().to_string()))
    }

    /// Finds the entry for a corp code.
    #[must_use]
    pub fn by_corp_code(&self, corp_code: &CorpCode) -> Option<&CorpEntry> {
        self.by_corp_code
            .get(corp_code.as_str())
            .and_then(|idx| self.entries.get(*idx))
    }
}
