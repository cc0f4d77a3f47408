//! Reporting periods: instants and durations.
//!
//! A period aspect value is either an instant (`2018-01-01T00:00:00`) or a
//! duration (`2018-01-01T00:00:00/2019-01-01T00:00:00`). Durations compare
//! as *equivalent* when their lengths differ by less than ten percent of
//! their combined length, which tolerates month-length drift between
//! fiscal years.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An instant or duration period.
///
/// For an instant only `to` is set; a duration runs from `from` to `to`.
///
/// # Examples
///
/// ```
/// use crossfoot::Period;
///
/// let instant: Period = "2019-01-01T00:00:00".parse().unwrap();
/// assert!(instant.is_instant());
///
/// let year: Period = "2018-01-01/2019-01-01".parse().unwrap();
/// assert!(!year.is_instant());
/// assert_eq!(year.duration().unwrap().num_days(), 365);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Start of a duration. `None` for an instant.
    pub from: Option<NaiveDateTime>,

    /// End of a duration, or the moment of an instant.
    pub to: NaiveDateTime,
}

impl Period {
    /// True if this period is an instant rather than a duration.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.from.is_none()
    }

    /// The length of a duration period. `None` for an instant.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        Some(self.to - self.from?)
    }

    /// True if two periods have equivalent length.
    ///
    /// Two instants are always equivalent; an instant and a duration never
    /// are. Two durations are equivalent when the difference between their
    /// lengths is less than a tenth of their combined length.
    #[must_use]
    pub fn is_equivalent_duration(&self, other: &Self) -> bool {
        match (self.duration(), other.duration()) {
            (None, None) => true,
            (Some(d1), Some(d2)) => {
                let diff = (d1 - d2).num_milliseconds().abs();
                let total = (d1 + d2).num_milliseconds();
                diff * 10 < total
            }
            _ => false,
        }
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPeriod {
            value: s.to_owned(),
        };
        match s.split_once('/') {
            Some((from, to)) => Ok(Self {
                from: Some(parse_datetime(from).ok_or_else(invalid)?),
                to: parse_datetime(to).ok_or_else(invalid)?,
            }),
            None => Ok(Self {
                from: None,
                to: parse_datetime(s).ok_or_else(invalid)?,
            }),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.from {
            Some(from) => write!(f, "{from}/{}", self.to),
            None => write!(f, "{}", self.to),
        }
    }
}

/// Parses a date-time, accepting a bare date as midnight.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
