//! Fiscal period definitions.
//!
//! This module defines [`Quarter`] and [`Period`] for fiscal reporting intervals,
//! and [`PeriodRequest`] for the optional year/quarter a caller supplies.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DartError, Result};

/// Fiscal quarter.
///
/// Variants are ordered so that `Q1 < Q2 < Q3 < Q4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quarter {
    /// First quarter (January to March).
    Q1,
    /// Second quarter; half-year report.
    Q2,
    /// Third quarter.
    Q3,
    /// Fourth quarter; annual business report.
    Q4,
}

impl Quarter {
    /// Returns the quarter number (1-4).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }
}

impl TryFrom<u8> for Quarter {
    type Error = DartError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            other => Err(DartError::InvalidParameter(format!(
                "quarter must be between 1 and 4, got {other}"
            ))),
        }
    }
}

impl From<Quarter> for u8 {
    fn from(quarter: Quarter) -> Self {
        quarter.number()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// A fiscal reporting interval.
///
/// Ordering is lexical on `(year, quarter)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Fiscal year.
    pub year: i32,
    /// Fiscal quarter.
    pub quarter: Quarter,
}

impl Period {
    /// Creates a new period.
    #[must_use]
    pub const fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// Returns the period one quarter earlier, wrapping Q1 to Q4 of the prior year.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self.quarter {
            Quarter::Q1 => Self::new(self.year - 1, Quarter::Q4),
            Quarter::Q2 => Self::new(self.year, Quarter::Q1),
            Quarter::Q3 => Self::new(self.year, Quarter::Q2),
            Quarter::Q4 => Self::new(self.year, Quarter::Q3),
        }
    }

    /// Returns the most recently closed quarter as of `today`.
    ///
    /// During January to March that is Q4 of the previous year, since the
    /// current year's first-quarter filings cannot exist yet.
    #[must_use]
    pub fn latest_closed(today: NaiveDate) -> Self {
        match (today.month() - 1) / 3 {
            0 => Self::new(today.year() - 1, Quarter::Q4),
            1 => Self::new(today.year(), Quarter::Q1),
            2 => Self::new(today.year(), Quarter::Q2),
            _ => Self::new(today.year(), Quarter::Q3),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.year, self.quarter)
    }
}

/// The optional year and quarter supplied with a lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// Requested fiscal year, if any.
    pub year: Option<i32>,
    /// Requested fiscal quarter, if any.
    pub quarter: Option<Quarter>,
}

impl PeriodRequest {
    /// A request with no period; the latest available filing is wanted.
    #[must_use]
    pub const fn latest() -> Self {
        Self {
            year: None,
            quarter: None,
        }
    }

    /// A fully explicit request for one period.
    #[must_use]
    pub const fn exact(period: Period) -> Self {
        Self {
            year: Some(period.year),
            quarter: Some(period.quarter),
        }
    }

    /// Builds a request from raw caller input, validating the quarter.
    ///
    /// # Errors
    /// Returns [`DartError::InvalidParameter`] if `quarter` is outside 1-4.
    pub fn from_parts(year: Option<i32>, quarter: Option<u8>) -> Result<Self> {
        let quarter = quarter.map(Quarter::try_from).transpose()?;
        Ok(Self { year, quarter })
    }

    /// Returns true when both year and quarter were supplied.
    ///
    /// Explicit requests are answered from exactly that period, even when empty.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.year.is_some() && self.quarter.is_some()
    }

    /// Returns the first period to query as of `today`.
    ///
    /// A year with no quarter maps to Q4 for past years and to the default
    /// quarter otherwise. A quarter with no year uses the default year.
    #[must_use]
    pub fn starting_period(&self, today: NaiveDate) -> Period {
        let default = Period::latest_closed(today);
        let year = self.year.unwrap_or(default.year);
        let quarter = self.quarter.unwrap_or(if year < today.year() {
            Quarter::Q4
        } else {
            default.quarter
        });
        Period::new(year, quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_wraps_year() {
        let p = Period::new(2025, Quarter::Q1);
        assert_eq!(p.previous(), Period::new(2024, Quarter::Q4));
        assert_eq!(p.previous().previous(), Period::new(2024, Quarter::Q3));
    }

    #[test]
    fn test_period_ordering() {
        assert!(Period::new(2024, Quarter::Q4) < Period::new(2025, Quarter::Q1));
        assert!(Period::new(2025, Quarter::Q2) > Period::new(2025, Quarter::Q1));
    }

    #[test]
    fn test_latest_closed() {
        assert_eq!(
            Period::latest_closed(date(2025, 2, 10)),
            Period::new(2024, Quarter::Q4)
        );
        assert_eq!(
            Period::latest_closed(date(2025, 8, 1)),
            Period::new(2025, Quarter::Q2)
        );
        assert_eq!(
            Period::latest_closed(date(2025, 12, 31)),
            Period::new(2025, Quarter::Q3)
        );
    }

    #[test]
    fn test_quarter_validation() {
        assert!(PeriodRequest::from_parts(Some(2024), Some(0)).is_err());
        assert!(PeriodRequest::from_parts(Some(2024), Some(5)).is_err());
        let req = PeriodRequest::from_parts(Some(2024), Some(3)).unwrap();
        assert_eq!(req.quarter, Some(Quarter::Q3));
        assert!(req.is_explicit());
    }

    #[test]
    fn test_starting_period_defaults() {
        let today = date(2025, 5, 20);
        assert_eq!(
            PeriodRequest::latest().starting_period(today),
            Period::new(2025, Quarter::Q1)
        );

        // Past year without quarter: annual report.
        let req = PeriodRequest::from_parts(Some(2023), None).unwrap();
        assert_eq!(req.starting_period(today), Period::new(2023, Quarter::Q4));
        assert!(!req.is_explicit());

        // Current year without quarter: default quarter.
        let req = PeriodRequest::from_parts(Some(2025), None).unwrap();
        assert_eq!(req.starting_period(today), Period::new(2025, Quarter::Q1));

        // Quarter without year: default year.
        let req = PeriodRequest::from_parts(None, Some(4)).unwrap();
        assert_eq!(req.starting_period(today), Period::new(2025, Quarter::Q4));
    }

    #[test]
    fn test_quarter_display_and_serde() {
        assert_eq!(Period::new(2024, Quarter::Q3).to_string(), "2024Q3");
        let json = serde_json::to_string(&Period::new(2024, Quarter::Q2)).unwrap();
        assert_eq!(json, r#"{"year":2024,"quarter":2}"#);
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quarter, Quarter::Q2);
        assert!(serde_json::from_str::<Period>(r#"{"year":2024,"quarter":7}"#).is_err());
    }
}
