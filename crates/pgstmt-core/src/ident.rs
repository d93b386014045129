use once_cell::sync::Lazy;
use proc_macro2::{Ident, Span};
use regex::Regex;

/// Names that cannot be fields even in raw form.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Turns a column or bind name into a field identifier.
///
/// Keywords come back as raw identifiers (`r#type`); anything that is not an
/// identifier at all yields `None`.
pub fn field_ident(name: &str) -> Option<Ident> {
    static FIELD: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
    if !FIELD.is_match(name) || RESERVED.contains(&name) {
        return None;
    }

    if syn::parse_str::<Ident>(name).is_ok() {
        Some(Ident::new(name, Span::call_site()))
    } else {
        Some(Ident::new_raw(name, Span::call_site()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_identifiers() {
        assert_eq!(field_ident("user_id").map(|i| i.to_string()), Some("user_id".into()));
        assert_eq!(field_ident("userID").map(|i| i.to_string()), Some("userID".into()));
        assert_eq!(field_ident("_age").map(|i| i.to_string()), Some("_age".into()));
    }

    #[test]
    fn keywords_become_raw() {
        assert_eq!(field_ident("type").map(|i| i.to_string()), Some("r#type".into()));
        assert_eq!(field_ident("match").map(|i| i.to_string()), Some("r#match".into()));
    }

    #[test]
    fn rejects_sql_expressions_and_reserved_names() {
        for name in ["1", "count(*)", "users.id", "NULL AS x", "", "self", "Self", "crate", "_"] {
            assert!(field_ident(name).is_none(), "{name}");
        }
    }
}
