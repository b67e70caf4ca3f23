//! Date-range predicates.
//!
//! A [`DateRange`] is either unbounded, an explicit inclusive window, or a
//! named [`Preset`] resolved against "now" every time a query runs. Day
//! boundaries are taken in the time zone of the reference instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use tracing::debug;

use crate::error::QueryError;
use crate::moment::{day_end, day_start, parse_date, Moment};
use crate::value::{Timestamp, Value};

/// Named relative window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Same local calendar day as now.
    Today,
    /// From exactly seven days before now onward.
    Last7Days,
    /// From exactly thirty days before now onward.
    Last30Days,
    /// Same calendar month and year as now.
    ThisMonth,
}

impl Preset {
    /// All presets, in the order a date dropdown lists them.
    pub const ALL: [Preset; 4] = [
        Preset::Today,
        Preset::Last7Days,
        Preset::Last30Days,
        Preset::ThisMonth,
    ];

    /// Returns the canonical name of this preset.
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Today => "today",
            Preset::Last7Days => "last7days",
            Preset::Last30Days => "last30days",
            Preset::ThisMonth => "thismonth",
        }
    }

    /// Resolves the preset to concrete bounds relative to `now`.
    ///
    /// Returns `None` only if the calendar arithmetic leaves chrono's range.
    pub fn window<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<Window> {
        let tz = now.timezone();
        let today = now.date_naive();
        match self {
            Preset::Today => Some(Window::new(
                Some(day_start(today, &tz)?),
                Some(day_end(today, &tz)?),
            )),
            Preset::Last7Days => trailing(now, 7),
            Preset::Last30Days => trailing(now, 30),
            Preset::ThisMonth => {
                let first = today.with_day(1)?;
                let next_month = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year().checked_add(1)?, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
                };
                let last = next_month.pred_opt()?;
                Some(Window::new(
                    Some(day_start(first, &tz)?),
                    Some(day_end(last, &tz)?),
                ))
            }
        }
    }
}

fn trailing<Tz: TimeZone>(now: &DateTime<Tz>, days: i64) -> Option<Window> {
    let start = now.clone().checked_sub_signed(Duration::days(days))?;
    Some(Window::new(Some(Timestamp::from_datetime(&start)), None))
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = QueryError;

    /// Parses a preset name, ignoring case, spaces, `_` and `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "today" | "hoje" => Ok(Preset::Today),
            "last7days" | "7d" | "7dias" => Ok(Preset::Last7Days),
            "last30days" | "30d" | "30dias" => Ok(Preset::Last30Days),
            "thismonth" | "mes" | "mês" | "estemes" | "estemês" => Ok(Preset::ThisMonth),
            _ => Err(QueryError::UnknownPreset(s.to_string())),
        }
    }
}

/// One end of an explicit date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateBound {
    /// A whole calendar day: the start of the day as a lower bound, its
    /// last millisecond as an upper bound.
    Day(NaiveDate),
    /// An exact moment.
    At(Moment),
}

impl DateBound {
    /// Parses a bound typed into a date picker.
    ///
    /// Date-only text becomes a whole-day bound; anything with a time part
    /// becomes an exact moment.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        if let Some(day) = parse_date(raw) {
            return Ok(DateBound::Day(day));
        }
        Moment::parse(raw).map(DateBound::At)
    }

    fn lower<Tz: TimeZone>(self, tz: &Tz) -> Option<Timestamp> {
        match self {
            DateBound::Day(day) => day_start(day, tz),
            DateBound::At(moment) => moment.resolve(tz),
        }
    }

    fn upper<Tz: TimeZone>(self, tz: &Tz) -> Option<Timestamp> {
        match self {
            DateBound::Day(day) => day_end(day, tz),
            DateBound::At(moment) => moment.resolve(tz),
        }
    }
}

impl From<NaiveDate> for DateBound {
    fn from(day: NaiveDate) -> Self {
        DateBound::Day(day)
    }
}

impl From<Timestamp> for DateBound {
    fn from(ts: Timestamp) -> Self {
        DateBound::At(Moment::Instant(ts))
    }
}

impl From<Moment> for DateBound {
    fn from(moment: Moment) -> Self {
        DateBound::At(moment)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateBound {
    fn from(at: DateTime<Tz>) -> Self {
        DateBound::At(Moment::Instant(Timestamp::from_datetime(&at)))
    }
}

impl FromStr for DateBound {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateBound::parse(s)
    }
}

/// Concrete inclusive bounds in milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// Earliest matching instant, if bounded below.
    pub start: Option<Timestamp>,
    /// Latest matching instant, if bounded above.
    pub end: Option<Timestamp>,
}

impl Window {
    /// Creates a window from optional bounds.
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Window { start, end }
    }

    /// Returns `true` if `ts` lies within the bounds.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }
}

/// Date criterion of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateRange {
    /// No date filtering.
    #[default]
    All,
    /// Explicit inclusive bounds; either side may be open.
    Between {
        /// Lower bound.
        from: Option<DateBound>,
        /// Upper bound.
        to: Option<DateBound>,
    },
    /// Named relative window.
    Preset(Preset),
}

impl DateRange {
    /// Inclusive range between two bounds.
    pub fn between(from: impl Into<DateBound>, to: impl Into<DateBound>) -> Self {
        DateRange::Between {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Everything at or after `from`.
    pub fn since(from: impl Into<DateBound>) -> Self {
        DateRange::Between {
            from: Some(from.into()),
            to: None,
        }
    }

    /// Everything at or before `to`.
    pub fn until(to: impl Into<DateBound>) -> Self {
        DateRange::Between {
            from: None,
            to: Some(to.into()),
        }
    }

    /// Returns `true` if this range never excludes anything.
    pub fn is_all(&self) -> bool {
        matches!(
            self,
            DateRange::All | DateRange::Between { from: None, to: None }
        )
    }

    /// Resolves the range against `now`.
    ///
    /// `None` means unbounded: every record passes, even ones without a
    /// readable date. An explicit bound that cannot be placed in the time
    /// zone is dropped rather than excluding everything.
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Window> {
        match self {
            DateRange::All => None,
            DateRange::Between { from: None, to: None } => None,
            DateRange::Between { from, to } => {
                let tz = now.timezone();
                let start = from.and_then(|bound| {
                    let resolved = bound.lower(&tz);
                    if resolved.is_none() {
                        debug!(?bound, "date range lower bound does not resolve; ignoring it");
                    }
                    resolved
                });
                let end = to.and_then(|bound| {
                    let resolved = bound.upper(&tz);
                    if resolved.is_none() {
                        debug!(?bound, "date range upper bound does not resolve; ignoring it");
                    }
                    resolved
                });
                if start.is_none() && end.is_none() {
                    debug!("no date range bound resolves; not filtering");
                    return None;
                }
                Some(Window::new(start, end))
            }
            DateRange::Preset(preset) => {
                let window = preset.window(now);
                if window.is_none() {
                    debug!(preset = %preset, "date preset out of calendar range; not filtering");
                }
                window
            }
        }
    }

    /// Tests a record's date value against the range at `now`.
    pub fn matches_at<Tz: TimeZone>(&self, value: &Value<'_>, now: &DateTime<Tz>) -> bool {
        match self.resolve(now) {
            None => true,
            Some(window) => window_contains(&window, value, &now.timezone()),
        }
    }
}

impl From<Preset> for DateRange {
    fn from(preset: Preset) -> Self {
        DateRange::Preset(preset)
    }
}

/// Tests a record value against resolved bounds.
///
/// Values that are not dates, or text that does not parse, are outside
/// every window.
pub(crate) fn window_contains<Tz: TimeZone>(window: &Window, value: &Value<'_>, tz: &Tz) -> bool {
    match value.moment().and_then(|moment| moment.resolve(tz)) {
        Some(ts) => window.contains(ts),
        None => false,
    }
}

/// Date-range match of a record's `field` at the current local time.
pub fn matches_date_range<T, F>(item: &T, field: &str, range: &DateRange, accessor: F) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    matches_date_range_at(item, field, range, accessor, &Local::now())
}

/// Date-range match of a record's `field` relative to `now`.
pub fn matches_date_range_at<T, F, Tz>(
    item: &T,
    field: &str,
    range: &DateRange,
    accessor: F,
    now: &DateTime<Tz>,
) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    Tz: TimeZone,
{
    range.is_all() || range.matches_at(&accessor(item, field), now)
}
