//! Sorting of query results.
//!
//! Provides [`Dir`] for sort direction, [`Sort`] for field-based ordering
//! and [`sort_by`] for ordering a sequence of records.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Offset, TimeZone, Utc};
use tracing::debug;

use crate::error::QueryError;
use crate::moment::Moment;
use crate::text::collate;
use crate::value::{Number, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// Reversing the comparator rather than the output keeps ties in their
    /// original relative order in both directions.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dir {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "crescente" => Ok(Dir::Asc),
            "desc" | "descending" | "decrescente" => Ok(Dir::Desc),
            _ => Err(QueryError::InvalidDirection(s.to_string())),
        }
    }
}

/// A sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    /// The field to sort by.
    pub key: String,
    /// The sort direction.
    pub dir: Dir,
}

impl Sort {
    /// Creates a new ascending sort on the given field.
    pub fn asc(key: impl Into<String>) -> Self {
        Sort::new(key, Dir::Asc)
    }

    /// Creates a new descending sort on the given field.
    pub fn desc(key: impl Into<String>) -> Self {
        Sort::new(key, Dir::Desc)
    }

    /// Creates a new sort with the given direction.
    pub fn new(key: impl Into<String>, dir: Dir) -> Self {
        Sort {
            key: key.into(),
            dir,
        }
    }

    /// Returns `true` if the key can name a field at all.
    pub fn is_valid(&self) -> bool {
        !self.key.trim().is_empty()
    }

    /// Compares two values according to this sort.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        self.dir.apply(compare_values(a, b))
    }
}

impl FromStr for Sort {
    type Err = QueryError;

    /// Parses `key`, `key:asc`, `key:desc` or `-key` (descending).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let sort = if let Some((key, dir)) = trimmed.split_once(':') {
            Sort::new(key.trim(), dir.parse()?)
        } else if let Some(key) = trimmed.strip_prefix('-') {
            Sort::desc(key.trim())
        } else {
            Sort::asc(trimmed)
        };
        if sort.is_valid() {
            Ok(sort)
        } else {
            Err(QueryError::InvalidSortKey(s.to_string()))
        }
    }
}

/// Compares two field values.
///
/// Numbers compare numerically and text with [`collate`]. Timestamps,
/// dates and text that parses as a date share one chronological order, with
/// wall-clock values read as UTC. Values of different kinds are ranked by
/// kind so the order stays total, with missing values last.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    SortKey::of(a, &Utc).compare(&SortKey::of(b, &Utc))
}

/// A field value reduced to what ordering needs.
///
/// Variants are declared in rank order: Bool < Number < Moment < Text < Missing.
#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Bool(bool),
    Number(Number),
    /// Milliseconds since Unix epoch.
    Moment(i64),
    Text(&'a str),
    Missing,
}

impl<'a> SortKey<'a> {
    fn of<Tz: TimeZone>(value: &Value<'a>, tz: &Tz) -> Self {
        match value {
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => SortKey::Number(*n),
            Value::Text(s) => match Moment::parse(s) {
                Ok(moment) => SortKey::Moment(moment_millis(moment, tz)),
                Err(_) => SortKey::Text(*s),
            },
            Value::Timestamp(_) | Value::Date(_) => value
                .moment()
                .map_or(SortKey::Missing, |moment| SortKey::Moment(moment_millis(moment, tz))),
            Value::None => SortKey::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Moment(_) => 2,
            SortKey::Text(_) => 3,
            SortKey::Missing => 4,
        }
    }

    fn compare(&self, other: &SortKey<'_>) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(*b),
            (SortKey::Moment(a), SortKey::Moment(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => collate(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn moment_millis<Tz: TimeZone>(moment: Moment, tz: &Tz) -> i64 {
    match moment {
        Moment::Instant(ts) => ts.as_millis(),
        Moment::Local(local) => match moment.resolve(tz) {
            Some(ts) => ts.as_millis(),
            // DST gap or out of range: shift by the offset in force at that
            // wall-clock time read as UTC.
            None => {
                let offset = tz.offset_from_utc_datetime(&local).fix().local_minus_utc();
                local.and_utc().timestamp_millis() - i64::from(offset) * 1000
            }
        },
    }
}

/// Compares two records using a list of sorts.
///
/// The first sort is the primary key, later ones break ties.
pub fn compare_by_sorts<T, F>(a: &T, b: &T, sorts: &[Sort], accessor: &F) -> Ordering
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    for sort in sorts {
        let ordering = sort.compare(&accessor(a, &sort.key), &accessor(b, &sort.key));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort of record references.
///
/// Blank keys and keys no record has are skipped, so an unknown sort key
/// leaves the order untouched. Wall-clock dates resolve in `tz`, and every
/// field is read and parsed once per record.
pub(crate) fn sort_records<'r, T, F, Tz>(
    records: &mut [&'r T],
    sorts: &[Sort],
    accessor: &F,
    tz: &Tz,
)
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    Tz: TimeZone,
{
    if records.len() < 2 {
        return;
    }
    let usable: Vec<&Sort> = sorts
        .iter()
        .filter(|sort| {
            if !sort.is_valid() {
                debug!(key = %sort.key, "blank sort key; keeping input order");
                return false;
            }
            if records.iter().all(|r| accessor(*r, &sort.key).is_none()) {
                debug!(key = %sort.key, "unknown sort key; keeping input order");
                return false;
            }
            true
        })
        .collect();
    if usable.is_empty() {
        return;
    }

    let mut keyed: Vec<(Vec<SortKey<'r>>, &'r T)> = records
        .iter()
        .map(|record| {
            let keys = usable
                .iter()
                .map(|sort| SortKey::of(&accessor(*record, &sort.key), tz))
                .collect();
            (keys, *record)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        usable
            .iter()
            .zip(a.iter().zip(b))
            .map(|(sort, (a, b))| sort.dir.apply(a.compare(b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
}

/// Returns the records ordered by `key`, leaving the input untouched.
///
/// The sort is stable; `Desc` reverses the comparator, so ties keep their
/// original relative order either way. Date strings without an offset are
/// ordered by their wall-clock time.
///
/// ```
/// use listquery::{sort_by, Dir, Number, Value};
///
/// let stock = [5i64, 20, 5, 1];
/// fn accessor<'a>(n: &'a i64, _field: &str) -> Value<'a> {
///     Value::Number(Number::I64(*n))
/// }
///
/// let sorted = sort_by(&stock, "stock", Dir::Desc, accessor);
/// assert_eq!(sorted, vec![&20, &5, &5, &1]);
/// ```
pub fn sort_by<'a, T, F>(
    records: impl IntoIterator<Item = &'a T>,
    key: &str,
    dir: Dir,
    accessor: F,
) -> Vec<&'a T>
where
    T: 'a,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let mut sorted: Vec<&'a T> = records.into_iter().collect();
    sort_records(&mut sorted, &[Sort::new(key, dir)], &accessor, &Utc);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Timestamp;

    #[derive(Debug)]
    struct Item {
        name: String,
        priority: i64,
    }

    fn item_accessor<'a>(item: &'a Item, field: &str) -> Value<'a> {
        match field {
            "name" => Value::Text(&item.name),
            "priority" => Value::Number(Number::I64(item.priority)),
            _ => Value::None,
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                name: "b".to_string(),
                priority: 1,
            },
            Item {
                name: "a".to_string(),
                priority: 2,
            },
            Item {
                name: "c".to_string(),
                priority: 1,
            },
        ]
    }

    #[test]
    fn dir_apply_and_parse() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!("DESC".parse::<Dir>(), Ok(Dir::Desc));
        assert_eq!("crescente".parse::<Dir>(), Ok(Dir::Asc));
        assert!(matches!(
            "up".parse::<Dir>(),
            Err(QueryError::InvalidDirection(_))
        ));
        assert_eq!(Dir::Desc.to_string(), "desc");
    }

    #[test]
    fn sort_parse_forms() {
        assert_eq!("name".parse::<Sort>(), Ok(Sort::asc("name")));
        assert_eq!("stock:desc".parse::<Sort>(), Ok(Sort::desc("stock")));
        assert_eq!("-price".parse::<Sort>(), Ok(Sort::desc("price")));
        assert!(matches!(
            "   ".parse::<Sort>(),
            Err(QueryError::InvalidSortKey(_))
        ));
        assert!(matches!(
            ":desc".parse::<Sort>(),
            Err(QueryError::InvalidSortKey(_))
        ));
        assert!(matches!(
            "name:sideways".parse::<Sort>(),
            Err(QueryError::InvalidDirection(_))
        ));
    }

    #[test]
    fn compare_values_by_kind() {
        assert_eq!(
            compare_values(&Value::Text("Óleo"), &Value::Text("pneu")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(
                &Value::Number(Number::I64(10)),
                &Value::Number(Number::F64(2.5))
            ),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(1)), &Value::Timestamp(Timestamp(2))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Ordering::Less
        );
    }

    #[test]
    fn missing_values_sort_last_ascending() {
        assert_eq!(
            compare_values(&Value::Text("x"), &Value::None),
            Ordering::Less
        );
        assert_eq!(compare_values(&Value::None, &Value::None), Ordering::Equal);
        assert_eq!(
            Sort::desc("f").compare(&Value::Text("x"), &Value::None),
            Ordering::Greater
        );
    }

    #[test]
    fn date_values_compare_chronologically() {
        let jan10 = chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(0)), &Value::Date(jan10)),
            Ordering::Less
        );
        // 2030 as an instant is later than a 2024 calendar day.
        assert_eq!(
            compare_values(
                &Value::Timestamp(Timestamp(1_893_456_000_000)),
                &Value::Date(jan10)
            ),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Text("10/01/2024"), &Value::Text("01/02/2024")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Text("10/01/2024"), &Value::Date(jan10)),
            Ordering::Equal
        );
        // Unparseable text keeps the text rank.
        assert_eq!(
            compare_values(&Value::Text("ontem"), &Value::Text("10/01/2024")),
            Ordering::Greater
        );
    }

    #[test]
    fn day_first_dates_sort_by_calendar() {
        let dates = ["10/01/2024", "01/02/2024", "25/12/2023"];
        fn accessor<'a>(date: &'a &str, _field: &str) -> Value<'a> {
            Value::Text(date)
        }
        assert_eq!(
            sort_by(&dates, "date", Dir::Asc, accessor),
            vec![&"25/12/2023", &"10/01/2024", &"01/02/2024"]
        );
        assert_eq!(
            sort_by(&dates, "date", Dir::Desc, accessor),
            vec![&"01/02/2024", &"10/01/2024", &"25/12/2023"]
        );
    }

    #[test]
    fn wall_clock_dates_resolve_in_given_zone() {
        // 09:00 at UTC-3 is 12:00Z, after an 11:00Z instant.
        let values = [
            Value::Text("2024-01-10T09:00:00"),
            Value::Timestamp(Timestamp(1_704_884_400_000)),
        ];
        let mut records: Vec<&Value<'static>> = values.iter().collect();
        fn accessor<'a>(value: &'a Value<'static>, _field: &str) -> Value<'a> {
            value.clone()
        }
        let brt = chrono::FixedOffset::west_opt(3 * 3600).unwrap();
        sort_records(&mut records, &[Sort::asc("at")], &accessor, &brt);
        assert_eq!(records[0], &values[1]);

        sort_records(&mut records, &[Sort::asc("at")], &accessor, &Utc);
        assert_eq!(records[0], &values[0]);
    }

    #[test]
    fn numeric_keys_sort_numerically() {
        let values = [10i64, 9, 100];
        fn accessor<'a>(n: &'a i64, _field: &str) -> Value<'a> {
            Value::Number(Number::I64(*n))
        }
        assert_eq!(
            sort_by(&values, "n", Dir::Asc, accessor),
            vec![&9, &10, &100]
        );
    }

    #[test]
    fn desc_keeps_ties_in_input_order() {
        let items = items();
        let sorted = sort_by(&items, "priority", Dir::Desc, item_accessor);
        let names: Vec<&str> = sorted.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let sorted = sort_by(&items, "priority", Dir::Asc, item_accessor);
        let names: Vec<&str> = sorted.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn unknown_or_blank_key_keeps_input_order() {
        let items = items();
        for key in ["missing", "", "  "] {
            let sorted = sort_by(&items, key, Dir::Desc, item_accessor);
            let names: Vec<&str> = sorted.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["b", "a", "c"], "key {key:?}");
        }
    }

    #[test]
    fn secondary_sort_breaks_ties() {
        let items = items();
        let sorts = vec![Sort::asc("priority"), Sort::desc("name")];
        assert_eq!(
            compare_by_sorts(&items[0], &items[2], &sorts, &item_accessor),
            Ordering::Greater
        );
        assert_eq!(
            compare_by_sorts(&items[0], &items[1], &sorts, &item_accessor),
            Ordering::Less
        );
    }
}
