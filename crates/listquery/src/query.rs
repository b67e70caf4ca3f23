//! Query builder and executor.
//!
//! The [`Query`] struct provides a fluent builder for the state of a list
//! page (search box, dropdown filters, date selector, sort selector,
//! pagination) and methods for running it against a collection.

use chrono::{DateTime, Local, TimeZone};

use crate::date::{window_contains, DateBound, DateRange, Preset, Window};
use crate::filter::{Criterion, FieldFilter, FilterValue};
use crate::op::Op;
use crate::ordering::{sort_records, Dir, Sort};
use crate::text::TextQuery;
use crate::traits::Listable;
use crate::value::Value;

/// Field read for date ranges unless the query names another one.
pub const DEFAULT_DATE_FIELD: &str = "date";

/// A search, filter and sort request over an in-memory collection.
///
/// A record is kept when all of these hold:
///
/// ```text
/// keep = text matches one search field (or text is blank)
///      ∧ every field filter matches (the "all" sentinel always does)
///      ∧ the date field lies in the date range (or the range is All)
/// ```
///
/// Kept records are then stably sorted and paginated. Running a query never
/// mutates the input and never fails: unknown sort keys leave the order
/// alone and unreadable dates only drop records when a range is active.
///
/// # Example
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use listquery::{Number, Preset, Query, Value};
///
/// struct Movement {
///     product: String,
///     kind: String,
///     quantity: i64,
///     date: String,
/// }
///
/// fn accessor<'a>(m: &'a Movement, field: &str) -> Value<'a> {
///     match field {
///         "product" => Value::Text(&m.product),
///         "kind" => Value::Text(&m.kind),
///         "quantity" => Value::Number(Number::I64(m.quantity)),
///         "date" => Value::Text(&m.date),
///         _ => Value::None,
///     }
/// }
///
/// let movements = vec![
///     Movement { product: "Óleo 5W30".into(), kind: "entrada".into(), quantity: 40, date: "2024-01-30".into() },
///     Movement { product: "Óleo 10W40".into(), kind: "saida".into(), quantity: 3, date: "2024-02-01".into() },
///     Movement { product: "Filtro".into(), kind: "entrada".into(), quantity: 12, date: "2024-02-01".into() },
/// ];
///
/// let query = Query::new()
///     .text("óleo")
///     .search_in(["product"])
///     .filter_eq("kind", "entrada")
///     .preset(Preset::Last7Days)
///     .order_desc("quantity")
///     .build();
///
/// let now = FixedOffset::west_opt(3 * 3600)
///     .unwrap()
///     .with_ymd_and_hms(2024, 2, 2, 9, 0, 0)
///     .unwrap();
/// let results = query.run_at(&movements, accessor, &now);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].product, "Óleo 5W30");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    text: TextQuery,
    search_fields: Vec<String>,
    filters: Vec<FieldFilter>,
    date_field: Option<String>,
    date_range: DateRange,
    sorts: Vec<Sort>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// Creates a new empty query.
    ///
    /// An empty query keeps every record in input order.
    pub fn new() -> Self {
        Query::default()
    }

    // ========================================================================
    // Text search
    // ========================================================================

    /// Sets the free-text search.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = TextQuery::with_folding(text, self.text.folds_accents());
        self
    }

    /// Adds a field to search with the free text.
    pub fn search_field(mut self, field: impl Into<String>) -> Self {
        self.search_fields.push(field.into());
        self
    }

    /// Adds several fields to search with the free text.
    pub fn search_in<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Also ignores diacritics when searching (`oleo` finds `Óleo`).
    pub fn fold_accents(mut self, fold: bool) -> Self {
        self.text = TextQuery::with_folding(self.text.raw().to_string(), fold);
        self
    }

    // ========================================================================
    // Field filters
    // ========================================================================

    /// Adds a field filter.
    pub fn filter(mut self, field: &str, criterion: Criterion) -> Self {
        self.filters.push(FieldFilter::new(field, criterion));
        self
    }

    /// Adds an equality filter, the usual dropdown selection.
    pub fn filter_eq(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(field, Criterion::eq(value))
    }

    /// Adds a comparison filter.
    pub fn filter_op(self, field: &str, op: Op, value: impl Into<FilterValue>) -> Self {
        self.filter(field, Criterion::Compare(op, value.into()))
    }

    /// Adds a filter requiring one of several values.
    pub fn filter_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(field, Criterion::OneOf(values))
    }

    /// Adds the "all" sentinel for a field, which matches everything.
    pub fn filter_all(self, field: &str) -> Self {
        self.filter(field, Criterion::All)
    }

    // ========================================================================
    // Date range
    // ========================================================================

    /// Names the record field holding the primary date.
    pub fn date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = Some(field.into());
        self
    }

    /// Sets the date range.
    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    /// Restricts to a named relative window.
    pub fn preset(self, preset: Preset) -> Self {
        self.date_range(DateRange::Preset(preset))
    }

    /// Restricts to an inclusive window.
    pub fn between(self, from: impl Into<DateBound>, to: impl Into<DateBound>) -> Self {
        self.date_range(DateRange::between(from, to))
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Adds a sort; the first one added is the primary key.
    pub fn order_by(mut self, key: &str, dir: Dir) -> Self {
        self.sorts.push(Sort::new(key, dir));
        self
    }

    /// Adds an ascending sort.
    pub fn order_asc(self, key: &str) -> Self {
        self.order_by(key, Dir::Asc)
    }

    /// Adds a descending sort.
    pub fn order_desc(self, key: &str) -> Self {
        self.order_by(key, Dir::Desc)
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Finalizes the query.
    pub fn build(self) -> Self {
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the free-text search.
    pub fn text_query(&self) -> &TextQuery {
        &self.text
    }

    /// Returns the explicitly configured search fields.
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Returns the field filters.
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// Returns the date field, falling back to [`DEFAULT_DATE_FIELD`].
    pub fn get_date_field(&self) -> &str {
        self.date_field.as_deref().unwrap_or(DEFAULT_DATE_FIELD)
    }

    /// Returns the date range.
    pub fn get_date_range(&self) -> &DateRange {
        &self.date_range
    }

    /// Returns the sorts.
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if set.
    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns `true` if this query keeps every record.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.filters.iter().all(|f| f.criterion.is_all())
            && self.date_range.is_all()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests a single record at the current local time.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.matches_at(item, accessor, &Local::now())
    }

    /// Tests a single record relative to `now`.
    pub fn matches_at<T, F, Tz>(&self, item: &T, accessor: F, now: &DateTime<Tz>) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        Tz: TimeZone,
    {
        self.plan(now, &[]).keeps(item, &accessor, None)
    }

    /// Runs the query at the current local time.
    ///
    /// Returns references to the kept records, sorted and paginated.
    pub fn run<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        self.run_at(items, accessor, &Local::now())
    }

    /// Runs the query with date presets resolved against `now`.
    pub fn run_at<'a, T, F, Tz>(&self, items: &'a [T], accessor: F, now: &DateTime<Tz>) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
        Tz: TimeZone,
    {
        self.execute(items, &accessor, &self.plan(now, &[]))
    }

    /// Runs the query and clones the kept records.
    pub fn run_cloned<T, F>(&self, items: &[T], accessor: F) -> Vec<T>
    where
        T: Clone,
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.run(items, accessor).into_iter().cloned().collect()
    }

    /// Runs the query and clones the kept records, relative to `now`.
    pub fn run_cloned_at<T, F, Tz>(&self, items: &[T], accessor: F, now: &DateTime<Tz>) -> Vec<T>
    where
        T: Clone,
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        Tz: TimeZone,
    {
        self.run_at(items, accessor, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Runs the query over a [`Listable`] collection at the current local
    /// time. Free text searches the type's default search fields unless
    /// the query names its own.
    pub fn run_listable<'a, T: Listable>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.run_listable_at(items, &Local::now())
    }

    /// Runs the query over a [`Listable`] collection relative to `now`.
    pub fn run_listable_at<'a, T, Tz>(&self, items: &'a [T], now: &DateTime<Tz>) -> Vec<&'a T>
    where
        T: Listable,
        Tz: TimeZone,
    {
        self.execute(items, &T::accessor, &self.plan(now, T::SEARCH_FIELDS))
    }

    /// Counts the records the query keeps, ignoring pagination.
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> usize
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.count_at(items, accessor, &Local::now())
    }

    /// Counts the records the query keeps relative to `now`.
    pub fn count_at<T, F, Tz>(&self, items: &[T], accessor: F, now: &DateTime<Tz>) -> usize
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        Tz: TimeZone,
    {
        let plan = self.plan(now, &[]);
        items
            .iter()
            .filter(|item| plan.keeps(*item, &accessor, None))
            .count()
    }

    /// Per-value record counts for a categorical field, at the current
    /// local time.
    ///
    /// See [`Query::facet_counts_at`].
    pub fn facet_counts<T, F>(&self, items: &[T], accessor: F, field: &str) -> Vec<(String, usize)>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.facet_counts_at(items, accessor, field, &Local::now())
    }

    /// Per-value record counts for a categorical field.
    ///
    /// Counts records kept by every predicate except the filters on `field`
    /// itself, so each tab badge shows what selecting it would yield.
    /// Values appear in order of first occurrence; records without a value
    /// for `field` are not counted.
    pub fn facet_counts_at<T, F, Tz>(
        &self,
        items: &[T],
        accessor: F,
        field: &str,
        now: &DateTime<Tz>,
    ) -> Vec<(String, usize)>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        Tz: TimeZone,
    {
        let plan = self.plan(now, &[]);
        let mut counts: Vec<(String, usize)> = Vec::new();
        for item in items.iter().filter(|item| plan.keeps(*item, &accessor, Some(field))) {
            let Some(key) = facet_key(&accessor(item, field)) else {
                continue;
            };
            match counts.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, count)) => *count += 1,
                None => counts.push((key, 1)),
            }
        }
        counts
    }

    fn plan<'q, Tz: TimeZone>(
        &'q self,
        now: &DateTime<Tz>,
        default_search: &'q [&'q str],
    ) -> Plan<'q, Tz> {
        let search_fields = if self.search_fields.is_empty() {
            default_search.to_vec()
        } else {
            self.search_fields.iter().map(String::as_str).collect()
        };
        Plan {
            query: self,
            search_fields,
            window: self.date_range.resolve(now),
            tz: now.timezone(),
        }
    }

    fn execute<'a, T, F, Tz>(&self, items: &'a [T], accessor: &F, plan: &Plan<'_, Tz>) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
        Tz: TimeZone,
    {
        let mut results: Vec<&'a T> = items
            .iter()
            .filter(|item| plan.keeps(*item, accessor, None))
            .collect();

        if !self.sorts.is_empty() {
            sort_records(&mut results, &self.sorts, accessor, &plan.tz);
        }

        let offset = self.offset.unwrap_or(0);
        if offset > 0 {
            if offset >= results.len() {
                return Vec::new();
            }
            results.drain(..offset);
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// A query with its per-run inputs resolved once.
struct Plan<'q, Tz: TimeZone> {
    query: &'q Query,
    search_fields: Vec<&'q str>,
    window: Option<Window>,
    tz: Tz,
}

impl<Tz: TimeZone> Plan<'_, Tz> {
    /// The composed predicate. Filters on `skip_field` are ignored.
    fn keeps<T, F>(&self, item: &T, accessor: &F, skip_field: Option<&str>) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        if !self.query.text.matches(item, &self.search_fields, accessor) {
            return false;
        }

        let filters_pass = self
            .query
            .filters
            .iter()
            .filter(|filter| Some(filter.field.as_str()) != skip_field)
            .all(|filter| filter.matches(item, accessor));
        if !filters_pass {
            return false;
        }

        match &self.window {
            None => true,
            Some(window) => {
                let value = accessor(item, self.query.get_date_field());
                window_contains(window, &value, &self.tz)
            }
        }
    }
}

fn facet_key(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Text(s) => Some((*s).to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Date(d) => Some(d.to_string()),
        Value::Timestamp(t) => Some(t.as_millis().to_string()),
        Value::None => None,
    }
}
