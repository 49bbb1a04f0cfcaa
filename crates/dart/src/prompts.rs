//! Prompt templates that accompany the lookup tools.
//!
//! Each template introduces a lookup result to a conversational client in
//! Korean, naming the company and period the answer came from.

use std::fmt;
use std::str::FromStr;

use dart_core::{DartError, Period, Result};

/// Fields reported for a dividend lookup, in response order.
pub const DIVIDEND_FIELDS: [&str; 9] = [
    "문서번호",
    "기업코드",
    "기업명",
    "당기순이익(백만원)",
    "현금배당수익률(%)",
    "주당순이익(원)",
    "주당 현금배당금(원)",
    "현금배당성향(%)",
    "현금배당금총액(백만원)",
];

/// The available prompt templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Dividend information for one quarter.
    Dividend,
    /// Financial statements for one quarter.
    Finance,
    /// Director and auditor compensation for one year.
    Compensation,
}

impl PromptKind {
    /// All prompt kinds.
    pub const ALL: [Self; 3] = [Self::Dividend, Self::Finance, Self::Compensation];

    /// The prompt's registered name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dividend => "dividend",
            Self::Finance => "finance",
            Self::Compensation => "compensation",
        }
    }

    /// Renders the prompt for a company and the period its data came from.
    ///
    /// Compensation is reported per fiscal year, so only the year is mentioned.
    #[must_use]
    pub fn render(&self, stock: &str, period: Period) -> String {
        let year = period.year;
        let quarter = period.quarter.number();
        match self {
            Self::Dividend => format!(
                "{stock}의 {year}년 {quarter}분기 배당 정보를 찾았습니다. {}을 응답합니다.",
                DIVIDEND_FIELDS.join(", ")
            ),
            Self::Finance => format!("{stock}의 {year}년 {quarter}분기 재무제표를 찾았습니다."),
            Self::Compensation => {
                format!("{stock}의 {year}년 이사 및 감사 보수 정보를 찾았습니다.")
            }
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKind {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DartError::InvalidParameter(format!(
                    "unknown prompt {s}; expected dividend, finance or compensation"
                ))
            })
    }
}
