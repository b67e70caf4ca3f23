//! Serializable list-page state.
//!
//! [`QueryParams`] is the shape a UI stores in its URL or settings: plain
//! strings for every selector. Converting it standardizes the "all"
//! sentinel spellings and parses presets, bounds and sort keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::{DateBound, DateRange, Preset};
use crate::error::Result;
use crate::ordering::Sort;
use crate::query::Query;

/// Filter values meaning "do not filter on this field".
const ALL_SENTINELS: &[&str] = &["all", "todos", "todas", "tudo"];

/// Returns `true` if a selector value means "all".
///
/// ```
/// use listquery::is_all_sentinel;
///
/// assert!(is_all_sentinel("Todos"));
/// assert!(is_all_sentinel("  "));
/// assert!(!is_all_sentinel("pendente"));
/// ```
pub fn is_all_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || ALL_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// List-page parameters as plain strings.
///
/// # Example
///
/// ```
/// use listquery::QueryParams;
///
/// let params: QueryParams = serde_json::from_str(r#"{
///     "text": "filtro",
///     "search": ["name", "sku"],
///     "filters": { "category": "todas", "supplier": "Bosch" },
///     "date": "7d",
///     "sort": "stock:desc"
/// }"#).unwrap();
///
/// let query = params.try_to_query().unwrap();
/// assert_eq!(query.filters().len(), 2);
/// assert!(query.filters()[0].criterion.is_all());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryParams {
    /// Free-text search.
    pub text: Option<String>,
    /// Fields searched by the free text.
    pub search: Vec<String>,
    /// Ignore diacritics when searching.
    pub fold_accents: bool,
    /// Dropdown selections by field.
    pub filters: BTreeMap<String, String>,
    /// Date preset name, or an "all" sentinel.
    pub date: Option<String>,
    /// Lower date bound.
    pub from: Option<String>,
    /// Upper date bound.
    pub to: Option<String>,
    /// Field holding the record date.
    pub date_field: Option<String>,
    /// Comma-separated sort keys: `key`, `key:desc` or `-key`.
    pub sort: Option<String>,
    /// Results to skip.
    pub offset: Option<usize>,
    /// Maximum results.
    pub limit: Option<usize>,
}

impl QueryParams {
    /// Converts to a query, ignoring whatever does not parse.
    ///
    /// Unknown presets count as "all", unparseable bounds and malformed
    /// sort keys are dropped. Each fallback emits a `debug` event.
    pub fn to_query(&self) -> Query {
        self.convert(false).unwrap_or_default()
    }

    /// Converts to a query, failing on the first input that does not parse.
    pub fn try_to_query(&self) -> Result<Query> {
        self.convert(true)
    }

    fn convert(&self, strict: bool) -> Result<Query> {
        let mut query = Query::new()
            .fold_accents(self.fold_accents)
            .text(self.text.clone().unwrap_or_default())
            .search_in(self.search.iter().cloned());

        for (field, value) in &self.filters {
            query = if is_all_sentinel(value) {
                query.filter_all(field)
            } else {
                query.filter_eq(field, value.as_str())
            };
        }

        if let Some(field) = self.date_field.as_deref().filter(|f| !f.trim().is_empty()) {
            query = query.date_field(field.trim());
        }
        query = query.date_range(self.date_range(strict)?);

        let sorts = self.sort.as_deref().unwrap_or("");
        for part in sorts.split(',').filter(|p| !p.trim().is_empty()) {
            match part.parse::<Sort>() {
                Ok(sort) => query = query.order_by(&sort.key, sort.dir),
                Err(err) if strict => return Err(err),
                Err(err) => debug!(key = part, %err, "ignoring malformed sort"),
            }
        }

        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query.build())
    }

    /// A preset wins over explicit bounds.
    fn date_range(&self, strict: bool) -> Result<DateRange> {
        if let Some(name) = self.date.as_deref().filter(|d| !is_all_sentinel(d)) {
            match name.parse::<Preset>() {
                Ok(preset) => return Ok(DateRange::Preset(preset)),
                Err(err) if strict => return Err(err),
                Err(err) => debug!(value = name, %err, "unknown date preset; showing all dates"),
            }
        }
        Ok(DateRange::Between {
            from: parse_bound(self.from.as_deref(), "from", strict)?,
            to: parse_bound(self.to.as_deref(), "to", strict)?,
        })
    }
}

fn parse_bound(raw: Option<&str>, side: &str, strict: bool) -> Result<Option<DateBound>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    match DateBound::parse(raw) {
        Ok(bound) => Ok(Some(bound)),
        Err(err) if strict => Err(err),
        Err(err) => {
            debug!(field = side, value = raw, %err, "ignoring unparseable date bound");
            Ok(None)
        }
    }
}
