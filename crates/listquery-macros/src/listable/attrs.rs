//! Attribute parsing for the Listable derive macro.
//!
//! Parses the `#[list(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

const KIND_NAMES: &str = "Text, Number, Date, Bool, Category";

/// The kind of a listable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text field: `#[list(Text)]`
    Text,
    /// Number field: `#[list(Number)]`
    Number,
    /// Date field: `#[list(Date)]`
    Date,
    /// Boolean field: `#[list(Bool)]`
    Bool,
    /// Categorical field: `#[list(Category)]`
    Category,
}

impl FieldKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Text" | "text" | "String" | "string" => Some(FieldKind::Text),
            "Number" | "number" => Some(FieldKind::Number),
            "Date" | "date" | "Timestamp" | "timestamp" => Some(FieldKind::Date),
            "Bool" | "bool" | "boolean" => Some(FieldKind::Bool),
            "Category" | "category" | "Enum" | "enum" => Some(FieldKind::Category),
            _ => None,
        }
    }

    /// Parse a field kind from an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        let name = ident.to_string();
        FieldKind::from_name(&name).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown list kind: '{}'. Expected one of: {}", name, KIND_NAMES),
            )
        })
    }

    /// Parse a field kind from a string literal.
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        FieldKind::from_name(s).ok_or_else(|| {
            Error::new(
                span,
                format!("unknown list kind: '{}'. Expected one of: {}", s, KIND_NAMES),
            )
        })
    }

    /// Returns `true` if free-text search can read this kind.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Category)
    }
}

/// Field-level attributes from `#[list(...)]`.
#[derive(Debug, Clone)]
pub struct ListAttr {
    /// The kind of this field.
    pub kind: Option<FieldKind>,
    /// Include in the default search fields.
    pub search: bool,
    /// Skip this field.
    pub skip: bool,
    /// Custom field name for queries (default: field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for ListAttr {
    fn default() -> Self {
        ListAttr {
            kind: None,
            search: false,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for ListAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ListAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // Kind or flag: list(Text), list(search), list(skip)
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if p.is_ident("search") {
                        attr.search = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(FieldKind::from_ident(ident)?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected list kind ({}), search, or skip", KIND_NAMES),
                        ));
                    }
                }

                // rename = "custom_name" or ty = "category"
                Meta::NameValue(nv) => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(nv.value.span(), "expected a string literal"));
                    };
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(s.value());
                    } else if nv.path.is_ident("ty") {
                        attr.kind = Some(FieldKind::from_str(&s.value(), s.span())?);
                        attr.span = s.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown list attribute. Expected: a kind, search, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        if attr.search && !attr.skip {
            match attr.kind {
                Some(kind) if kind.is_textual() => {}
                Some(_) => {
                    return Err(Error::new(
                        attr.span,
                        "search requires a Text or Category field",
                    ))
                }
                None => {
                    return Err(Error::new(
                        attr.span,
                        "search requires a field kind, e.g. #[list(Text, search)]",
                    ))
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[list(...)]` attributes from a field's attributes.
pub fn parse_list_attrs(attrs: &[Attribute]) -> Result<ListAttr> {
    for attr in attrs {
        if attr.path().is_ident("list") {
            return attr.parse_args::<ListAttr>();
        }
    }
    Ok(ListAttr::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_list(tokens: &str) -> Result<ListAttr> {
        syn::parse_str::<ListAttr>(tokens)
    }

    #[test]
    fn test_list_text() {
        let attr = parse_list("Text").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Text));
        assert!(!attr.search);
        assert!(!attr.skip);
    }

    #[test]
    fn test_list_kinds() {
        assert_eq!(parse_list("Number").unwrap().kind, Some(FieldKind::Number));
        assert_eq!(parse_list("Date").unwrap().kind, Some(FieldKind::Date));
        assert_eq!(parse_list("Bool").unwrap().kind, Some(FieldKind::Bool));
        assert_eq!(parse_list("Category").unwrap().kind, Some(FieldKind::Category));
        assert_eq!(parse_list("timestamp").unwrap().kind, Some(FieldKind::Date));
    }

    #[test]
    fn test_list_text_search() {
        let attr = parse_list("Text, search").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Text));
        assert!(attr.search);
    }

    #[test]
    fn test_list_category_via_ty() {
        let attr = parse_list(r#"ty = "category", search"#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Category));
        assert!(attr.search);
    }

    #[test]
    fn test_list_skip() {
        let attr = parse_list("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.kind, None);
    }

    #[test]
    fn test_list_rename() {
        let attr = parse_list(r#"Date, rename = "date""#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Date));
        assert_eq!(attr.rename, Some("date".to_string()));
    }

    #[test]
    fn test_list_invalid_kind() {
        let result = parse_list("Money");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown list kind"));
    }

    #[test]
    fn test_list_search_needs_text() {
        let err = parse_list("Number, search").unwrap_err();
        assert!(err.to_string().contains("Text or Category"));

        let err = parse_list("search").unwrap_err();
        assert!(err.to_string().contains("requires a field kind"));
    }

    #[test]
    fn test_list_rename_must_be_string() {
        assert!(parse_list("Text, rename = 3").is_err());
        assert!(parse_list(r#"Text, label = "x""#).is_err());
    }
}
