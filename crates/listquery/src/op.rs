//! Comparison operators for field filters.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::QueryError;

/// Comparison operator for a field filter.
///
/// Dropdown filters use `Eq`; the ordering operators back range-style
/// dropdowns such as "4 stars and up" or "stock below 10".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    /// Equal (exact match).
    #[default]
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl Op {
    /// Evaluates the operator given how the field compares to the filter
    /// value.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "==" => Ok(Op::Eq),
            "ne" | "!=" | "<>" => Ok(Op::Ne),
            "gt" | ">" => Ok(Op::Gt),
            "gte" | ">=" => Ok(Op::Gte),
            "lt" | "<" => Ok(Op::Lt),
            "lte" | "<=" => Ok(Op::Lte),
            _ => Err(QueryError::UnknownOperator(s.to_string())),
        }
    }
}
