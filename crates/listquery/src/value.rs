//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is what an accessor hands back for a record field:
//! text, numbers, instants, calendar days and booleans.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::moment::Moment;

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use listquery::{Number, Value};
///
/// struct Product {
///     name: String,
///     stock: u32,
/// }
///
/// fn accessor<'a>(product: &'a Product, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::Text(&product.name),
///         "stock" => Value::Number(Number::from(product.stock)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Text value (borrowed). Also used for categorical keys and for dates
    /// stored as strings, which are parsed when a date range needs them.
    Text(&'a str),
    /// Numeric value.
    Number(Number),
    /// Absolute instant (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Calendar day without a time zone, read as local midnight.
    Date(NaiveDate),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or unsupported.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the text value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the calendar day, if present.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interprets this value as a point in time.
    ///
    /// Text is parsed with [`Moment::parse`]; numbers, booleans and
    /// unparseable text yield `None`.
    pub fn moment(&self) -> Option<Moment> {
        match self {
            Value::Timestamp(t) => Some(Moment::Instant(*t)),
            Value::Date(d) => Some(Moment::from(*d)),
            Value::Text(s) => Moment::parse(s).ok(),
            _ => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons stay exact across variants, including between integers
/// and floats beyond 2^53.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for a floating point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::F64(b)) => int_cmp_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => int_cmp_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => int_cmp_float(i128::from(b), a).map(Ordering::reverse),
            (Number::F64(a), Number::U64(b)) => int_cmp_float(i128::from(b), a).map(Ordering::reverse),
        }
    }

    /// Total order used for sorting: NaN sorts after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

// Exact integer/float comparison; casting the integer to f64 loses
// precision above 2^53.
fn int_cmp_float(int: i128, float: f64) -> Option<Ordering> {
    const LIMIT: f64 = 18_446_744_073_709_551_616.0; // 2^64
    if float.is_nan() {
        return None;
    }
    let whole = float.trunc();
    if whole >= LIMIT {
        return Some(Ordering::Less);
    }
    if whole < -LIMIT {
        return Some(Ordering::Greater);
    }
    match int.cmp(&(whole as i128)) {
        Ordering::Equal if float > whole => Some(Ordering::Less),
        Ordering::Equal if float < whole => Some(Ordering::Greater),
        ord => Some(ord),
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Instant represented as milliseconds since Unix epoch.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use listquery::Timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
/// let ts = Timestamp::from_datetime(&at);
/// assert_eq!(ts.as_millis(), 1_704_844_800_000);
/// assert!(Timestamp(1000) < Timestamp(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a timestamp from a zoned date-time.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Timestamp(at.timestamp_millis())
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(at: DateTime<Tz>) -> Self {
        Timestamp::from_datetime(&at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::Text("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(
            Value::Timestamp(Timestamp(1000)).as_timestamp(),
            Some(Timestamp(1000))
        );
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(Value::Date(day).as_date(), Some(day));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));

        // Wrong kind returns None
        assert_eq!(Value::Text("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
        assert!(Value::None.is_none());
    }

    #[test]
    fn value_moment_parses_text() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(Value::Text("2024-01-10").moment(), Some(Moment::from(day)));
        assert_eq!(Value::Date(day).moment(), Some(Moment::from(day)));
        assert_eq!(
            Value::Timestamp(Timestamp(5)).moment(),
            Some(Moment::Instant(Timestamp(5)))
        );
        assert_eq!(Value::Text("not a date").moment(), None);
        assert_eq!(Value::Number(Number::I64(1)).moment(), None);
    }

    #[test]
    fn number_comparisons_same_type() {
        assert_eq!(
            Number::I64(5).compare(Number::I64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(10).compare(Number::U64(5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(5.0).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(-1).compare(Number::U64(u64::MAX)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::U64(10).compare(Number::F64(5.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn number_comparisons_exact_beyond_f64_precision() {
        let big = 1i64 << 53;
        assert_eq!(
            Number::I64(big + 1).compare(Number::F64(big as f64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(big as f64).compare(Number::I64(big + 1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(big).compare(Number::F64(big as f64)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::F64(u64::MAX as f64)),
            Some(Ordering::Less)
        );

        // Transitive: a > b and b == c imply a > c.
        let a = Number::I64(big + 1);
        let b = Number::F64(big as f64);
        let c = Number::I64(big);
        assert_eq!(a.compare(b), Some(Ordering::Greater));
        assert_eq!(b.compare(c), Some(Ordering::Equal));
        assert_eq!(a.compare(c), Some(Ordering::Greater));
    }

    #[test]
    fn number_comparisons_with_fractions() {
        assert_eq!(Number::I64(3).compare(Number::F64(3.5)), Some(Ordering::Less));
        assert_eq!(Number::I64(4).compare(Number::F64(3.5)), Some(Ordering::Greater));
        assert_eq!(Number::I64(-3).compare(Number::F64(-3.5)), Some(Ordering::Greater));
        assert_eq!(Number::I64(-4).compare(Number::F64(-3.5)), Some(Ordering::Less));
        assert_eq!(Number::F64(-0.5).compare(Number::U64(0)), Some(Ordering::Less));
        assert_eq!(Number::I64(0).compare(Number::F64(f64::INFINITY)), Some(Ordering::Less));
        assert_eq!(Number::I64(0).compare(Number::F64(f64::NEG_INFINITY)), Some(Ordering::Greater));
        assert_eq!(Number::I64(1).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn number_nan_handling() {
        let nan = Number::F64(f64::NAN);
        assert_eq!(nan.compare(Number::F64(1.0)), None);
        assert_eq!(nan.total_cmp(Number::I64(1)), Ordering::Greater);
        assert_eq!(Number::I64(1).total_cmp(nan), Ordering::Less);
        assert_eq!(nan.total_cmp(nan), Ordering::Equal);
    }

    #[test]
    fn number_conversions_and_display() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u32), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
        assert_eq!(Number::from(4.5f64).to_string(), "4.5");
        assert_eq!(Number::from(20usize).to_string(), "20");
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_millis(5000).as_millis(), 5000);
        assert_eq!(Timestamp::from(-1i64), Timestamp(-1));
        let at = chrono::Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(Timestamp::from(at).as_millis(), 1_706_788_800_000);
    }
}
