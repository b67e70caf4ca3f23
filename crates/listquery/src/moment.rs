//! Parsing of record dates.
//!
//! Records coming from mock arrays or remote rows frequently carry their
//! primary date as a string. A [`Moment`] is either an absolute instant or
//! a wall-clock time that only becomes an instant once a time zone is known.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::error::{QueryError, Result};
use crate::value::Timestamp;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Day-first variants follow the pt-BR convention used in the dashboards.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// A point in time, possibly still waiting for a time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moment {
    /// Absolute instant.
    Instant(Timestamp),
    /// Wall-clock time in whatever zone the query is evaluated in.
    Local(NaiveDateTime),
}

impl Moment {
    /// Parses a date or date-time string.
    ///
    /// Accepts RFC 3339, naive ISO date-times, ISO dates and day-first
    /// dates (`10/01/2024`). Date-only input becomes local midnight.
    ///
    /// ```
    /// use listquery::Moment;
    ///
    /// assert!(matches!(Moment::parse("2024-01-10"), Ok(Moment::Local(_))));
    /// assert!(matches!(Moment::parse("2024-01-10T08:30:00Z"), Ok(Moment::Instant(_))));
    /// assert!(Moment::parse("ontem").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::UnparseableDate(raw.to_string()));
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Moment::Instant(Timestamp::from_datetime(&at)));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Moment::Local(local));
            }
        }

        parse_date(trimmed)
            .map(Moment::from)
            .ok_or_else(|| QueryError::UnparseableDate(raw.to_string()))
    }

    /// Resolves this moment to an instant in the given time zone.
    ///
    /// Ambiguous wall-clock times take the earlier instant; times falling in
    /// a DST gap resolve to `None`.
    pub fn resolve<Tz: TimeZone>(self, tz: &Tz) -> Option<Timestamp> {
        match self {
            Moment::Instant(ts) => Some(ts),
            Moment::Local(local) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|at| Timestamp::from_datetime(&at)),
        }
    }
}

impl From<NaiveDate> for Moment {
    fn from(day: NaiveDate) -> Self {
        Moment::Local(day.and_time(NaiveTime::MIN))
    }
}

impl From<Timestamp> for Moment {
    fn from(ts: Timestamp) -> Self {
        Moment::Instant(ts)
    }
}

impl FromStr for Moment {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Moment::parse(s)
    }
}

/// Parses a date-only string in any of the supported layouts.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// First instant of a calendar day in `tz`.
///
/// Some zones skip midnight on DST transitions; the day then starts at the
/// first valid wall-clock hour.
pub(crate) fn day_start<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<Timestamp> {
    (0..3).find_map(|hour| {
        let local = day.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&local)
            .earliest()
            .map(|at| Timestamp::from_datetime(&at))
    })
}

/// Last millisecond of a calendar day in `tz`.
pub(crate) fn day_end<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<Timestamp> {
    let next = day.succ_opt()?;
    day_start(next, tz).map(|ts| Timestamp(ts.0 - 1))
}
