//! Discrete-field filters.
//!
//! A [`FieldFilter`] pairs a field name with a [`Criterion`]. The
//! [`Criterion::All`] sentinel is what a dropdown's "all" option maps to:
//! it matches every record, including records where the field is missing.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::moment::parse_date;
use crate::op::Op;
use crate::text::collate;
use crate::value::{Number, Timestamp, Value};

/// Owned value a filter compares against.
///
/// Text filter values are coerced when the field holds a number, boolean
/// or calendar day, since dropdown selections arrive as strings.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Text or categorical key.
    Text(String),
    /// Numeric value.
    Number(Number),
    /// Absolute instant.
    Timestamp(Timestamp),
    /// Calendar day.
    Date(NaiveDate),
    /// Boolean value.
    Bool(bool),
}

impl FilterValue {
    /// Orders the field value relative to this filter value.
    ///
    /// Returns `None` when the two cannot be compared: missing field, kind
    /// mismatch, failed coercion or NaN.
    pub fn compare_field(&self, field: &Value<'_>) -> Option<Ordering> {
        match (self, field) {
            (FilterValue::Text(wanted), Value::Text(s)) => Some(collate(s, wanted)),
            (FilterValue::Text(wanted), Value::Number(n)) => {
                let wanted = wanted.trim().parse::<f64>().ok()?;
                n.compare(Number::F64(wanted))
            }
            (FilterValue::Text(wanted), Value::Date(d)) => Some(d.cmp(&parse_date(wanted)?)),
            (FilterValue::Text(wanted), Value::Bool(b)) => Some(b.cmp(&parse_bool(wanted)?)),
            (FilterValue::Number(wanted), Value::Number(n)) => n.compare(*wanted),
            (FilterValue::Number(wanted), Value::Text(s)) => {
                let n = s.trim().parse::<f64>().ok()?;
                Number::F64(n).compare(*wanted)
            }
            (FilterValue::Timestamp(wanted), Value::Timestamp(t)) => Some(t.cmp(wanted)),
            (FilterValue::Date(wanted), Value::Date(d)) => Some(d.cmp(wanted)),
            (FilterValue::Date(wanted), Value::Text(s)) => Some(parse_date(s)?.cmp(wanted)),
            (FilterValue::Bool(wanted), Value::Bool(b)) => Some(b.cmp(wanted)),
            _ => None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "sim" | "yes" | "1" => Some(true),
        "false" | "nao" | "não" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<Number> for FilterValue {
    fn from(n: Number) -> Self {
        FilterValue::Number(n)
    }
}

impl From<Timestamp> for FilterValue {
    fn from(t: Timestamp) -> Self {
        FilterValue::Timestamp(t)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        FilterValue::Date(d)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

macro_rules! filter_value_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for FilterValue {
                fn from(n: $source) -> Self {
                    FilterValue::Number(Number::from(n))
                }
            }
        )*
    };
}

filter_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// What a field filter requires of a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Criterion {
    /// The "no filter" sentinel; always matches.
    #[default]
    All,
    /// Field compares to the value with the given operator.
    Compare(Op, FilterValue),
    /// Field equals one of the values.
    OneOf(Vec<FilterValue>),
}

impl Criterion {
    /// Equality criterion, the usual dropdown filter.
    pub fn eq(value: impl Into<FilterValue>) -> Self {
        Criterion::Compare(Op::Eq, value.into())
    }

    /// Returns `true` for the "no filter" sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, Criterion::All)
    }

    /// Evaluates this criterion against a field value.
    ///
    /// A missing or incomparable field never satisfies a criterion other
    /// than `All`, including `Ne`.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match self {
            Criterion::All => true,
            Criterion::Compare(op, wanted) => wanted
                .compare_field(field_value)
                .is_some_and(|ordering| op.eval_ordering(ordering)),
            Criterion::OneOf(values) => values
                .iter()
                .any(|wanted| wanted.compare_field(field_value) == Some(Ordering::Equal)),
        }
    }
}

/// A filter on one field of a record.
///
/// # Example
///
/// ```
/// use listquery::{Criterion, FieldFilter, Value};
///
/// let pending = FieldFilter::eq("status", "pendente");
/// let everything = FieldFilter::all("status");
///
/// fn accessor<'a>(status: &'a String, _field: &str) -> Value<'a> {
///     Value::Text(status)
/// }
///
/// let done = "concluido".to_string();
/// assert!(!pending.matches(&done, accessor));
/// assert!(everything.matches(&done, accessor));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// The field name to read.
    pub field: String,
    /// The requirement on that field.
    pub criterion: Criterion,
}

impl FieldFilter {
    /// Creates a new filter.
    pub fn new(field: impl Into<String>, criterion: Criterion) -> Self {
        FieldFilter {
            field: field.into(),
            criterion,
        }
    }

    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        FieldFilter::new(field, Criterion::eq(value))
    }

    /// Creates a filter holding the "all" sentinel.
    pub fn all(field: impl Into<String>) -> Self {
        FieldFilter::new(field, Criterion::All)
    }

    /// Tests a record.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        // The sentinel never needs to look at the record.
        self.criterion.is_all() || self.criterion.matches(&accessor(item, &self.field))
    }
}

/// Equality-style match of one field; `Criterion::All` always matches.
pub fn matches_field<T, F>(item: &T, field: &str, criterion: &Criterion, accessor: F) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    criterion.is_all() || criterion.matches(&accessor(item, field))
}
