//! Core data types for disclosure lookups.
//!
//! This module defines the fundamental data structures:
//!
//! - [`CorpCode`] - Provider-internal company identifier
//! - [`ReportCategory`] - One independently queried report type
//! - [`Record`] - One normalized disclosure record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// DART's stable 8-digit company code.
///
/// Distinct from the 6-digit exchange ticker; obtained from the corp-code table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpCode(String);

impl CorpCode {
    /// Creates a corp code from its string form, trimming whitespace.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_string())
    }

    /// Returns the corp code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorpCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CorpCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A report type that is fetched and period-resolved on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Full single-company financial statements.
    FinancialStatements,
    /// Matters concerning dividends.
    Dividends,
    /// Individual compensation of directors and auditors (500M KRW or more).
    DirectorCompensation,
    /// Total compensation paid to all directors and auditors.
    TotalDirectorCompensation,
    /// Individual compensation of the top five earners (500M KRW or more).
    Top5DirectorCompensation,
}

impl ReportCategory {
    /// Categories bundled by the compensation lookup, in output order.
    pub const COMPENSATION: [Self; 3] = [
        Self::DirectorCompensation,
        Self::TotalDirectorCompensation,
        Self::Top5DirectorCompensation,
    ];

    /// Returns the stable snake-case name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialStatements => "financial_statements",
            Self::Dividends => "dividends",
            Self::DirectorCompensation => "director_compensation",
            Self::TotalDirectorCompensation => "total_director_compensation",
            Self::Top5DirectorCompensation => "top5_director_compensation",
        }
    }

    /// Returns the Korean display name used in DART reports.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::FinancialStatements => "단일회사 전체 재무제표",
            Self::Dividends => "배당에 관한 사항",
            Self::DirectorCompensation => "이사·감사의 개인별 보수현황(5억원 이상)",
            Self::TotalDirectorCompensation => "이사·감사 전체의 보수현황",
            Self::Top5DirectorCompensation => "개인별 보수지급 금액(5억이상 상위5인)",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized disclosure record.
///
/// Field names and shapes are owned by the provider; this crate only moves
/// records around and checks whether a batch is empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field, replacing any previous value.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a field, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a field as a string slice, if it is a JSON string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the record and returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Object(record.0)
    }
}
