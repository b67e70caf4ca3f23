//! Free-text search and locale-aware string ordering.

use std::cmp::Ordering;

use deunicode::deunicode;

use crate::value::Value;

/// A normalized free-text search.
///
/// Matching is a case-insensitive substring test against each of the
/// record's searchable fields. Empty or whitespace-only text matches every
/// record.
///
/// ```
/// use listquery::TextQuery;
///
/// let query = TextQuery::new("  filtro ");
/// assert!(query.matches_str("Filtro de óleo"));
/// assert!(!query.matches_str("Pastilha"));
/// assert!(TextQuery::new("   ").matches_str("anything"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    raw: String,
    needle: String,
    fold_accents: bool,
}

impl TextQuery {
    /// Creates a case-insensitive search for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_folding(text, false)
    }

    /// Creates a search that optionally ignores diacritics as well as case.
    pub fn with_folding(text: impl Into<String>, fold_accents: bool) -> Self {
        let raw = text.into();
        let needle = normalize(raw.trim(), fold_accents);
        TextQuery {
            raw,
            needle,
            fold_accents,
        }
    }

    /// The text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns `true` when there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns `true` if diacritics are ignored.
    pub fn folds_accents(&self) -> bool {
        self.fold_accents
    }

    /// Tests a single string.
    pub fn matches_str(&self, haystack: &str) -> bool {
        self.is_empty() || normalize(haystack, self.fold_accents).contains(&self.needle)
    }

    /// Tests a record against the given searchable fields.
    ///
    /// Only text values take part; numbers, dates and missing fields never
    /// satisfy a non-empty search. With no fields to search, nothing is
    /// filtered out.
    pub fn matches<T, F, S>(&self, item: &T, fields: &[S], accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        S: AsRef<str>,
    {
        if self.is_empty() || fields.is_empty() {
            return true;
        }
        fields.iter().any(|field| match accessor(item, field.as_ref()) {
            Value::Text(s) => self.matches_str(s),
            _ => false,
        })
    }
}

/// Case-insensitive substring match of `text` over a record's `fields`.
///
/// Empty or whitespace-only `text` matches everything.
pub fn matches_text<T, F, S>(item: &T, text: &str, fields: &[S], accessor: F) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    S: AsRef<str>,
{
    TextQuery::new(text).matches(item, fields, accessor)
}

fn normalize(s: &str, fold_accents: bool) -> String {
    if fold_accents {
        deunicode(s).to_lowercase()
    } else {
        s.to_lowercase()
    }
}

/// Locale-aware string comparison.
///
/// Strings are ordered by their base letters first (ignoring case and
/// diacritics), then unaccented before accented, then lowercase before
/// uppercase. Byte order is only the last resort, so `"árvore"` sorts
/// between `"arte"` and `"barco"`, and `"ébano"` lands next to `"ebano"`.
///
/// ```
/// use std::cmp::Ordering;
/// use listquery::collate;
///
/// assert_eq!(collate("Óleo", "pneu"), Ordering::Less);
/// assert_eq!(collate("arte", "árvore"), Ordering::Less);
/// assert_eq!(collate("a", "A"), Ordering::Less);
/// ```
pub fn collate(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    normalize(a, true)
        .cmp(&normalize(b, true))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_order(a, b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Part {
        name: String,
        sku: String,
        stock: i64,
    }

    fn accessor<'a>(part: &'a Part, field: &str) -> Value<'a> {
        match field {
            "name" => Value::Text(&part.name),
            "sku" => Value::Text(&part.sku),
            "stock" => Value::Number(part.stock.into()),
            _ => Value::None,
        }
    }

    fn part() -> Part {
        Part {
            name: "Filtro de Óleo".to_string(),
            sku: "FLT-001".to_string(),
            stock: 12,
        }
    }

    #[test]
    fn empty_text_matches_everything() {
        let part = part();
        assert!(matches_text(&part, "", &["name"], accessor));
        assert!(matches_text(&part, "   \t", &["name"], accessor));
    }

    #[test]
    fn matches_any_listed_field_ignoring_case() {
        let part = part();
        assert!(matches_text(&part, "FILTRO", &["name", "sku"], accessor));
        assert!(matches_text(&part, "flt-0", &["name", "sku"], accessor));
        assert!(!matches_text(&part, "flt-0", &["name"], accessor));
    }

    #[test]
    fn non_text_fields_never_match() {
        let part = part();
        assert!(!matches_text(&part, "12", &["stock"], accessor));
        assert!(!matches_text(&part, "x", &["missing"], accessor));
    }

    #[test]
    fn no_fields_means_no_text_filtering() {
        let part = part();
        let fields: [&str; 0] = [];
        assert!(matches_text(&part, "zzz", &fields, accessor));
    }

    #[test]
    fn accent_folding_is_opt_in() {
        let plain = TextQuery::new("oleo");
        let folded = TextQuery::with_folding("oleo", true);
        assert!(!plain.matches_str("Filtro de Óleo"));
        assert!(folded.matches_str("Filtro de Óleo"));
        assert!(TextQuery::new("óleo").matches_str("FILTRO DE ÓLEO"));
    }

    #[test]
    fn raw_text_is_preserved() {
        let query = TextQuery::new(" Pneu ");
        assert_eq!(query.raw(), " Pneu ");
        assert!(!query.is_empty());
        assert!(!query.folds_accents());
    }

    #[test]
    fn collate_orders_by_base_letters() {
        let mut names = vec!["barco", "Árvore", "arte", "Zebra", "abacate"];
        names.sort_by(|a, b| collate(a, b));
        assert_eq!(names, vec!["abacate", "arte", "Árvore", "barco", "Zebra"]);
    }

    #[test]
    fn collate_breaks_ties_by_accent_then_case() {
        assert_eq!(collate("ebano", "ébano"), Ordering::Less);
        assert_eq!(collate("ébano", "ebano"), Ordering::Greater);
        assert_eq!(collate("pneu", "Pneu"), Ordering::Less);
        assert_eq!(collate("Pneu", "pneu"), Ordering::Greater);
        assert_eq!(collate("pneu", "pneu"), Ordering::Equal);
    }

    #[test]
    fn collate_is_not_byte_order() {
        // Byte order would put every uppercase letter first.
        assert_eq!(collate("amortecedor", "Bateria"), Ordering::Less);
        assert_eq!("amortecedor".cmp("Bateria"), Ordering::Greater);
    }
}
