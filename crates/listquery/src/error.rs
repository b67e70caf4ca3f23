//! Error types for the listquery crate.
//!
//! None of these escape [`Query::run`](crate::Query::run): the engine absorbs
//! them by degrading toward showing more data. They surface only from the
//! explicit parsing helpers and strict parameter conversion.

use thiserror::Error;

/// Errors produced while parsing query inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Sort key is empty or otherwise unusable.
    #[error("invalid sort key: {0:?}")]
    InvalidSortKey(String),

    /// Sort direction is neither ascending nor descending.
    #[error("invalid sort direction: {0:?} (expected asc or desc)")]
    InvalidDirection(String),

    /// Date text could not be parsed in any supported format.
    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),

    /// Date preset name is not recognized.
    #[error("unknown date preset: {0:?}")]
    UnknownPreset(String),

    /// Filter operator is not recognized.
    #[error("unknown filter operator: {0:?}")]
    UnknownOperator(String),
}

/// Result type for listquery operations.
pub type Result<T> = std::result::Result<T, QueryError>;
