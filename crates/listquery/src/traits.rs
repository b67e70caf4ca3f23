//! Traits for record types and derive macro support.
//!
//! [`Listable`] is implemented by `#[derive(Listable)]` (feature `macros`)
//! or by hand. [`ListCategory`] and [`ListDate`] adapt field types the
//! derive cannot map on its own.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::value::{Timestamp, Value};

/// A record type that can be searched, filtered and sorted.
///
/// # Derive Usage
///
/// ```
/// # #[cfg(feature = "macros")] {
/// use listquery::{Listable, Query};
///
/// #[derive(Listable)]
/// struct Product {
///     #[list(Text, search)]
///     name: String,
///     #[list(Text, search)]
///     sku: String,
///     #[list(Number)]
///     stock: u32,
/// }
///
/// let products = vec![
///     Product { name: "Filtro A".into(), sku: "F1".into(), stock: 5 },
///     Product { name: "Pastilha".into(), sku: "P9".into(), stock: 2 },
/// ];
///
/// assert_eq!(Product::SEARCH_FIELDS, &["name", "sku"]);
/// let query = Query::new().text("p9").order_desc(Product::STOCK).build();
/// let results = query.run_listable(&products);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].name, "Pastilha");
/// # }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use listquery::{Listable, Number, Value};
///
/// struct Review {
///     author: String,
///     rating: u8,
/// }
///
/// impl Listable for Review {
///     const SEARCH_FIELDS: &'static [&'static str] = &["author"];
///
///     fn list_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "author" => Value::Text(&self.author),
///             "rating" => Value::Number(Number::from(self.rating)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Listable {
    /// Fields searched by free text when the query names none.
    const SEARCH_FIELDS: &'static [&'static str] = &[];

    /// Returns the value of a field, or [`Value::None`] for unknown names.
    fn list_value(&self, field: &str) -> Value<'_>;

    /// Accessor function suitable for the query execution methods.
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.list_value(field)
    }
}

/// Categorical field types (status, movement type, service category).
///
/// Filters compare the returned key for equality, so it should match the
/// option values the UI puts in its dropdowns.
///
/// ```
/// use listquery::ListCategory;
///
/// enum Status {
///     Pending,
///     Confirmed,
/// }
///
/// impl ListCategory for Status {
///     fn category_key(&self) -> &str {
///         match self {
///             Status::Pending => "pendente",
///             Status::Confirmed => "confirmado",
///         }
///     }
/// }
///
/// assert_eq!(Status::Confirmed.category_key(), "confirmado");
/// ```
pub trait ListCategory {
    /// Returns the stable key of this category.
    fn category_key(&self) -> &str;
}

impl ListCategory for String {
    fn category_key(&self) -> &str {
        self
    }
}

impl ListCategory for &str {
    fn category_key(&self) -> &str {
        self
    }
}

/// Field types usable as a record's primary date.
pub trait ListDate {
    /// Returns the date as a field value.
    fn list_date(&self) -> Value<'_>;
}

impl ListDate for String {
    fn list_date(&self) -> Value<'_> {
        Value::Text(self)
    }
}

impl ListDate for &str {
    fn list_date(&self) -> Value<'_> {
        Value::Text(self)
    }
}

impl ListDate for i64 {
    fn list_date(&self) -> Value<'_> {
        Value::Timestamp(Timestamp::from_millis(*self))
    }
}

impl ListDate for Timestamp {
    fn list_date(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl ListDate for NaiveDate {
    fn list_date(&self) -> Value<'_> {
        Value::Date(*self)
    }
}

impl<Tz: TimeZone> ListDate for DateTime<Tz> {
    fn list_date(&self) -> Value<'_> {
        Value::Timestamp(Timestamp::from_datetime(self))
    }
}

impl<T: ListDate> ListDate for Option<T> {
    fn list_date(&self) -> Value<'_> {
        match self {
            Some(date) => date.list_date(),
            None => Value::None,
        }
    }
}
