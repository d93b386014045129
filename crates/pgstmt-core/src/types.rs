//! Registry of the scalar types a template may name.
//!
//! Every accepted spelling maps to exactly one Rust type that `sqlx` can both
//! encode as a bind parameter and decode from a Postgres row.

use std::fmt;

use proc_macro2::TokenStream;
use quote::quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    Bytes,
    Uuid,
    Json,
    Date,
    Time,
    Timestamp,
    TimestampTz,
}

const SPELLINGS: &[(&str, ScalarType)] = &[
    ("bool", ScalarType::Bool),
    ("Bool", ScalarType::Bool),
    ("i16", ScalarType::Int16),
    ("Int16", ScalarType::Int16),
    ("i32", ScalarType::Int32),
    ("Int32", ScalarType::Int32),
    ("i64", ScalarType::Int64),
    ("Int64", ScalarType::Int64),
    ("Int", ScalarType::Int64),
    ("f32", ScalarType::Float32),
    ("Float", ScalarType::Float32),
    ("f64", ScalarType::Float64),
    ("Double", ScalarType::Float64),
    ("String", ScalarType::Text),
    ("Bytes", ScalarType::Bytes),
    ("Uuid", ScalarType::Uuid),
    ("UUID", ScalarType::Uuid),
    ("Json", ScalarType::Json),
    ("JsonValue", ScalarType::Json),
    ("Date", ScalarType::Date),
    ("NaiveDate", ScalarType::Date),
    ("Time", ScalarType::Time),
    ("NaiveTime", ScalarType::Time),
    ("Timestamp", ScalarType::Timestamp),
    ("NaiveDateTime", ScalarType::Timestamp),
    ("TimestampTz", ScalarType::TimestampTz),
    ("DateTime", ScalarType::TimestampTz),
];

impl ScalarType {
    pub fn lookup(name: &str) -> Option<Self> {
        SPELLINGS
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, ty)| *ty)
    }

    /// All spellings that resolve to this type.
    pub fn spellings(self) -> impl Iterator<Item = &'static str> {
        SPELLINGS
            .iter()
            .filter(move |(_, ty)| *ty == self)
            .map(|(spelling, _)| *spelling)
    }

    /// The concrete Rust type, with `krate` as the path of the runtime crate
    /// re-exporting `sqlx`.
    pub fn rust_type(self, krate: &syn::Path) -> TokenStream {
        match self {
            ScalarType::Bool => quote!(bool),
            ScalarType::Int16 => quote!(i16),
            ScalarType::Int32 => quote!(i32),
            ScalarType::Int64 => quote!(i64),
            ScalarType::Float32 => quote!(f32),
            ScalarType::Float64 => quote!(f64),
            ScalarType::Text => quote!(::std::string::String),
            ScalarType::Bytes => quote!(::std::vec::Vec<u8>),
            ScalarType::Uuid => quote!(#krate::sqlx::types::Uuid),
            ScalarType::Json => quote!(#krate::sqlx::types::JsonValue),
            ScalarType::Date => quote!(#krate::sqlx::types::chrono::NaiveDate),
            ScalarType::Time => quote!(#krate::sqlx::types::chrono::NaiveTime),
            ScalarType::Timestamp => quote!(#krate::sqlx::types::chrono::NaiveDateTime),
            ScalarType::TimestampTz => quote! {
                #krate::sqlx::types::chrono::DateTime<#krate::sqlx::types::chrono::Utc>
            },
        }
    }
}

/// A resolved type reference: a registered scalar, optionally nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// The spelling used in the template.
    pub name: String,
    pub scalar: ScalarType,
    pub optional: bool,
}

impl TypeRef {
    pub fn new(scalar: ScalarType, optional: bool) -> Self {
        let name = scalar.spellings().next().unwrap_or_default().to_string();
        TypeRef {
            name,
            scalar,
            optional,
        }
    }

    /// Resolves `Name` or `Option<Name>`. Any other shape, including a nested
    /// `Option<Option<Name>>`, and any unregistered name yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let ty: syn::Type = syn::parse_str(text).ok()?;
        let (ident, optional) = match option_inner(&ty) {
            Some(inner) => (bare_ident(inner)?, true),
            None => (bare_ident(&ty)?, false),
        };

        let name = ident.to_string();
        let scalar = ScalarType::lookup(&name)?;
        Some(TypeRef {
            name,
            scalar,
            optional,
        })
    }

    pub fn to_tokens(&self, krate: &syn::Path) -> TokenStream {
        let ty = self.scalar.rust_type(krate);
        if self.optional {
            quote!(::std::option::Option<#ty>)
        } else {
            ty
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Option<{}>", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

fn bare_ident(ty: &syn::Type) -> Option<&syn::Ident> {
    match ty {
        syn::Type::Path(tp) if tp.qself.is_none() => tp.path.get_ident(),
        _ => None,
    }
}

fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(tp) = ty else {
        return None;
    };
    if tp.qself.is_some() || tp.path.segments.len() != 1 {
        return None;
    }
    let seg = tp.path.segments.first()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn resolves_bare_and_optional_types() {
        let bare = TypeRef::parse("Uuid").expect("bare");
        assert_eq!(bare.scalar, ScalarType::Uuid);
        assert!(!bare.optional);

        let optional = TypeRef::parse("Option<i64>").expect("optional");
        assert_eq!(optional.scalar, ScalarType::Int64);
        assert!(optional.optional);
        assert_eq!(optional.to_string(), "Option<i64>");
    }

    #[test]
    fn accepts_every_registered_spelling() {
        for (spelling, scalar) in SPELLINGS {
            let ty = TypeRef::parse(spelling).expect(spelling);
            assert_eq!(ty.scalar, *scalar);
            assert_eq!(ty.name, *spelling);
        }
    }

    #[test]
    fn rejects_double_optional() {
        assert_eq!(TypeRef::parse("Option<Option<Uuid>>"), None);
    }

    #[test]
    fn rejects_unregistered_and_unsupported_shapes() {
        for text in [
            "Widget",
            "Option",
            "Option<Widget>",
            "&str",
            "(i32, i64)",
            "[u8; 4]",
            "Vec<u8>",
            "std::string::String",
            "Option<i32, i64>",
            "UUID?",
            "",
        ] {
            assert_eq!(TypeRef::parse(text), None, "{text}");
        }
    }

    #[test]
    fn maps_to_sqlx_types_under_the_runtime_crate() {
        let krate: syn::Path = parse_quote!(::pgstmt);
        assert_eq!(
            ScalarType::Uuid.rust_type(&krate).to_string(),
            quote!(::pgstmt::sqlx::types::Uuid).to_string()
        );
        assert_eq!(
            TypeRef::new(ScalarType::Text, true).to_tokens(&krate).to_string(),
            quote!(::std::option::Option<::std::string::String>).to_string()
        );
    }

    #[test]
    fn spellings_round_trip_through_lookup() {
        assert_eq!(
            ScalarType::Int64.spellings().collect::<Vec<_>>(),
            vec!["i64", "Int64", "Int"]
        );
        assert_eq!(TypeRef::new(ScalarType::Float64, false).name, "f64");
    }
}
