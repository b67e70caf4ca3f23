//! Integration tests for the Listable derive macro.
//!
//! These tests verify that `#[derive(Listable)]` generates correct field
//! constants, default search fields and value accessors.

#![cfg(feature = "macros")]
#![allow(dead_code)] // Some fields are intentionally skipped for testing

use chrono::{FixedOffset, NaiveDate, TimeZone};
use listquery::{ListCategory, Listable, Number, Preset, Query, QueryParams, Timestamp, Value};

// =============================================================================
// Basic derive tests
// =============================================================================

#[derive(Listable)]
struct Product {
    #[list(Text, search)]
    name: String,

    #[list(Text, search)]
    sku: String,

    #[list(Number)]
    stock: u32,

    #[list(Bool)]
    active: bool,

    #[list(Date)]
    date: String,

    #[list(skip)]
    internal_id: u64,

    notes: String,
}

fn product(name: &str, sku: &str, stock: u32, date: &str) -> Product {
    Product {
        name: name.to_string(),
        sku: sku.to_string(),
        stock,
        active: true,
        date: date.to_string(),
        internal_id: 0,
        notes: String::new(),
    }
}

#[test]
fn test_field_values() {
    let p = product("Filtro A", "F1", 5, "2024-01-10");

    assert_eq!(p.list_value("name"), Value::Text("Filtro A"));
    assert_eq!(p.list_value("stock"), Value::Number(Number::U64(5)));
    assert_eq!(p.list_value("active"), Value::Bool(true));
    assert_eq!(p.list_value("date"), Value::Text("2024-01-10"));
}

#[test]
fn test_field_constants_generated() {
    assert_eq!(Product::NAME, "name");
    assert_eq!(Product::SKU, "sku");
    assert_eq!(Product::STOCK, "stock");
    assert_eq!(Product::ACTIVE, "active");
    assert_eq!(Product::DATE, "date");
}

#[test]
fn test_search_fields_in_declaration_order() {
    assert_eq!(Product::SEARCH_FIELDS, &["name", "sku"]);
}

#[test]
fn test_skipped_and_unannotated_fields_return_none() {
    let p = product("Filtro A", "F1", 5, "2024-01-10");

    assert_eq!(p.list_value("internal_id"), Value::None);
    assert_eq!(p.list_value("notes"), Value::None);
    assert_eq!(p.list_value("unknown"), Value::None);
    assert_eq!(p.list_value(""), Value::None);
}

#[test]
fn test_run_listable_uses_default_search_fields() {
    let products = vec![
        product("Filtro A", "F1", 5, "2024-01-10"),
        product("Filtro B", "F2", 20, "2024-02-01"),
        product("Pastilha", "P9", 2, "2024-02-01"),
    ];

    let query = Query::new()
        .text("filtro")
        .order_desc(Product::STOCK)
        .build();
    let now = FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 2, 2, 9, 0, 0)
        .unwrap();
    let names: Vec<&str> = query
        .run_listable_at(&products, &now)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Filtro B", "Filtro A"]);

    let recent = Query::new()
        .preset(Preset::Last7Days)
        .order_asc(Product::NAME)
        .build();
    let names: Vec<&str> = recent
        .run_listable_at(&products, &now)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Filtro B", "Pastilha"]);
}

#[test]
fn test_day_first_text_dates_sort_chronologically() {
    let products = vec![
        product("Filtro A", "F1", 5, "10/01/2024"),
        product("Filtro B", "F2", 20, "01/02/2024"),
        product("Pastilha", "P9", 2, "25/12/2023"),
    ];

    let oldest_first = Query::new().order_asc(Product::DATE).build();
    let names: Vec<&str> = oldest_first
        .run_listable(&products)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Pastilha", "Filtro A", "Filtro B"]);

    let newest_first = Query::new().order_desc(Product::DATE).build();
    let names: Vec<&str> = newest_first
        .run_listable(&products)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Filtro B", "Filtro A", "Pastilha"]);
}

#[test]
fn test_explicit_search_fields_override_defaults() {
    let products = vec![product("Filtro A", "F1", 5, "2024-01-10")];
    let by_name = Query::new().text("F1").search_field(Product::NAME).build();
    assert!(by_name.run_listable(&products).is_empty());
}

// =============================================================================
// Categories, dates and renames
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    In,
    Out,
    Adjustment,
}

impl ListCategory for Kind {
    fn category_key(&self) -> &str {
        match self {
            Kind::In => "entrada",
            Kind::Out => "saida",
            Kind::Adjustment => "ajuste",
        }
    }
}

#[derive(Listable)]
struct Movement {
    #[list(Text, search)]
    product: String,

    #[list(Category, search)]
    kind: Kind,

    #[list(Number)]
    quantity: i32,

    #[list(Date, rename = "date")]
    created_at: Timestamp,

    #[list(ty = "date")]
    reviewed_on: Option<NaiveDate>,
}

fn movement(product: &str, kind: Kind, quantity: i32, created_at: i64) -> Movement {
    Movement {
        product: product.to_string(),
        kind,
        quantity,
        created_at: Timestamp::from_millis(created_at),
        reviewed_on: None,
    }
}

#[test]
fn test_category_and_renamed_date() {
    let m = movement("Óleo", Kind::Out, 3, 1_706_745_600_000);

    assert_eq!(m.list_value("kind"), Value::Text("saida"));
    assert_eq!(m.list_value("date"), Value::Timestamp(Timestamp(1_706_745_600_000)));
    assert_eq!(m.list_value("created_at"), Value::None);
    assert_eq!(m.list_value("reviewed_on"), Value::None);
    assert_eq!(Movement::DATE, "date");
    assert_eq!(Movement::REVIEWED_ON, "reviewed_on");
    assert_eq!(Movement::SEARCH_FIELDS, &["product", "kind"]);
}

#[test]
fn test_params_over_derived_records() {
    let movements = vec![
        movement("Filtro A", Kind::In, 10, 0),
        movement("Filtro A", Kind::Out, 2, 0),
        movement("Pastilha", Kind::Adjustment, 1, 0),
        movement("Óleo", Kind::Out, 6, 0),
    ];

    let params: QueryParams =
        serde_json::from_str(r#"{ "filters": { "kind": "saida" }, "sort": "-quantity" }"#).unwrap();
    let query = params.to_query();

    let products: Vec<&str> = query
        .run_listable(&movements)
        .iter()
        .map(|m| m.product.as_str())
        .collect();
    assert_eq!(products, vec!["Óleo", "Filtro A"]);

    assert_eq!(
        query.facet_counts(&movements, Movement::accessor, Movement::KIND),
        vec![
            ("entrada".to_string(), 1),
            ("saida".to_string(), 2),
            ("ajuste".to_string(), 1),
        ]
    );

    let searched = Query::new().text("ajus").build();
    assert_eq!(searched.run_listable(&movements).len(), 1);
}
