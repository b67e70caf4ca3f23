//! Proc macros for listquery.
//!
//! - [`Listable`] - Generate field constants and a `Listable` impl from
//!   struct field annotations
//!
//! For working examples, see `listquery/tests/listable_derive.rs`.

mod listable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Listable` trait for record structs.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `Text` | Text field, searchable and filterable |
/// | `Number` | Numeric field (any primitive number, `Copy`) |
/// | `Date` | Primary date field - requires `ListDate` impl |
/// | `Bool` | Boolean field |
/// | `Category` | Categorical field - requires `ListCategory` impl |
/// | `search` | Include in the default free-text search fields |
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom name for queries |
/// | `ty = "..."` | Field kind as a string, e.g. `ty = "category"` |
///
/// Fields without a kind are not exposed.
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Product::NAME`, `Product::STOCK`)
/// 2. `Listable::SEARCH_FIELDS` listing the `search` fields in order
/// 3. Implementation of `Listable::list_value()`
///
/// # Example
///
/// ```ignore
/// use listquery::{ListCategory, Listable, Query};
///
/// enum Kind { In, Out }
///
/// impl ListCategory for Kind {
///     fn category_key(&self) -> &str {
///         match self {
///             Kind::In => "entrada",
///             Kind::Out => "saida",
///         }
///     }
/// }
///
/// #[derive(Listable)]
/// struct Movement {
///     #[list(Text, search)]
///     product: String,
///     #[list(Category)]
///     kind: Kind,
///     #[list(Number)]
///     quantity: i32,
///     #[list(Date, rename = "date")]
///     created_at: String,
///     #[list(skip)]
///     id: u64,
/// }
///
/// let query = Query::new()
///     .text("filtro")
///     .filter_eq(Movement::KIND, "saida")
///     .order_desc(Movement::QUANTITY)
///     .build();
/// let results = query.run_listable(&movements);
/// ```
#[proc_macro_derive(Listable, attributes(list))]
pub fn listable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    listable::listable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
