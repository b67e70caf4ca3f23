//! Implementation of the `#[derive(Listable)]` macro.
//!
//! Generates an implementation of the `Listable` trait and field name
//! constants for type-safe query building.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_list_attrs, FieldKind};

/// Main implementation of the Listable derive macro.
pub fn listable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Ensure we have a struct with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Listable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Listable can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut search_fields: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let list_attrs = parse_list_attrs(&field.attrs)?;
        if list_attrs.skip {
            continue;
        }

        // Fields without a kind are not exposed
        let kind = match list_attrs.kind {
            Some(kind) => kind,
            None => continue,
        };

        let query_name = list_attrs
            .rename
            .unwrap_or_else(|| field_name.to_string());
        if seen.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate list field name: '{}'", query_name),
            ));
        }
        seen.push(query_name.clone());

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            /// Field name constant for type-safe queries.
            pub const #const_name: &'static str = #query_name;
        });

        if list_attrs.search {
            search_fields.push(query_name.clone());
        }

        let value_expr = match kind {
            FieldKind::Text => {
                quote! { ::listquery::Value::Text(&self.#field_name) }
            }
            FieldKind::Number => {
                quote! { ::listquery::Value::Number(::listquery::Number::from(self.#field_name)) }
            }
            FieldKind::Date => {
                quote! { ::listquery::ListDate::list_date(&self.#field_name) }
            }
            FieldKind::Bool => {
                quote! { ::listquery::Value::Bool(self.#field_name) }
            }
            FieldKind::Category => {
                quote! {
                    ::listquery::Value::Text(
                        ::listquery::ListCategory::category_key(&self.#field_name)
                    )
                }
            }
        };

        field_matches.push(quote! {
            #query_name => #value_expr,
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::listquery::Listable for #struct_name #ty_generics #where_clause {
            const SEARCH_FIELDS: &'static [&'static str] = &[#(#search_fields),*];

            fn list_value(&self, field: &str) -> ::listquery::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::listquery::Value::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
