//! listquery - Search, filter and sort for in-memory list views.
//!
//! listquery runs the criteria behind a list page (search box, dropdown
//! filters, date selector, sort selector) against a slice of records. It
//! supports:
//!
//! - Case-insensitive substring search across chosen fields
//! - Equality and comparison filters with an "all" sentinel
//! - Date ranges: explicit bounds or presets resolved against "now"
//! - Stable multi-key sorting with locale-aware text collation
//! - Pagination, facet counts and serializable page parameters
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone};
//! use listquery::{Number, Preset, Query, Value};
//!
//! struct Product {
//!     name: String,
//!     sku: String,
//!     stock: u32,
//!     updated: String,
//! }
//!
//! fn accessor<'a>(p: &'a Product, field: &str) -> Value<'a> {
//!     match field {
//!         "name" => Value::Text(&p.name),
//!         "sku" => Value::Text(&p.sku),
//!         "stock" => Value::Number(Number::from(p.stock)),
//!         "date" => Value::Text(&p.updated),
//!         _ => Value::None,
//!     }
//! }
//!
//! let products = vec![
//!     Product { name: "Filtro A".into(), sku: "F1".into(), stock: 5, updated: "2024-01-10".into() },
//!     Product { name: "Filtro B".into(), sku: "F2".into(), stock: 20, updated: "2024-02-01".into() },
//! ];
//!
//! let by_stock = Query::new()
//!     .text("filtro")
//!     .search_in(["name", "sku"])
//!     .order_desc("stock")
//!     .build();
//! let names: Vec<&str> = by_stock
//!     .run(&products, accessor)
//!     .iter()
//!     .map(|p| p.name.as_str())
//!     .collect();
//! assert_eq!(names, ["Filtro B", "Filtro A"]);
//!
//! let now = FixedOffset::west_opt(3 * 3600)
//!     .unwrap()
//!     .with_ymd_and_hms(2024, 2, 2, 10, 0, 0)
//!     .unwrap();
//! let recent = Query::new().preset(Preset::Last7Days).order_asc("name").build();
//! let results = recent.run_at(&products, accessor, &now);
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].name, "Filtro B");
//! ```
//!
//! # Query Semantics
//!
//! A record is kept when every active predicate holds:
//!
//! ```text
//! keep = (text is blank ∨ some search field contains text)
//!      ∧ (every field filter matches; the "all" sentinel always does)
//!      ∧ (date range is All ∨ the date field falls inside it)
//! ```
//!
//! Kept records are stably sorted and then paginated. Execution never fails
//! and never mutates its input: unusable sort keys leave the order as it was
//! and records whose date cannot be read are only excluded while a date
//! range is active.
//!
//! # Field Kinds
//!
//! | Kind | Search | Filter operators | Date range |
//! |------|--------|------------------|------------|
//! | Text | yes | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte`, one-of | if it parses as a date |
//! | Number | no | all comparisons | no |
//! | Timestamp | no | all comparisons | yes |
//! | Date | no | all comparisons | yes (whole local day) |
//! | Bool | no | `Eq`, `Ne` | no |

mod date;
mod error;
mod filter;
mod moment;
mod op;
mod ordering;
mod params;
mod query;
mod text;
mod traits;
mod value;

// Re-export public API
pub use date::{
    matches_date_range, matches_date_range_at, DateBound, DateRange, Preset, Window,
};
pub use error::{QueryError, Result};
pub use filter::{matches_field, Criterion, FieldFilter, FilterValue};
pub use moment::Moment;
pub use op::Op;
pub use ordering::{compare_by_sorts, compare_values, sort_by, Dir, Sort};
pub use params::{is_all_sentinel, QueryParams};
pub use query::{Query, DEFAULT_DATE_FIELD};
pub use text::{collate, matches_text, TextQuery};
pub use traits::{ListCategory, ListDate, Listable};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "macros")]
pub use listquery_macros::Listable;
