use darling::ast::NestedMeta;
use darling::FromMeta;
use pgstmt_core::ExpandOptions;
use proc_macro2::TokenStream;
use syn::{Lit, LitStr};

#[derive(Debug, FromMeta)]
pub struct StatementOpts {
    #[darling(default, rename = "crate")]
    pub krate: Option<syn::Path>,

    #[darling(default)]
    pub row: Option<syn::Ident>,
}

impl StatementOpts {
    pub fn into_options(self) -> ExpandOptions {
        let defaults = ExpandOptions::default();
        ExpandOptions {
            krate: self.krate.unwrap_or(defaults.krate),
            row: self.row,
        }
    }
}

/// `"template", name = value, ...`
pub fn parse(args: TokenStream) -> Result<(LitStr, StatementOpts), darling::Error> {
    let mut items = NestedMeta::parse_meta_list(args)?.into_iter();

    let template = match items.next() {
        Some(NestedMeta::Lit(Lit::Str(template))) => template,
        Some(other) => {
            return Err(darling::Error::custom(
                "expected the statement template as the first argument",
            )
            .with_span(&other))
        }
        None => {
            return Err(darling::Error::custom(
                "missing statement template, e.g. #[statement(\"SELECT {id, Uuid} FROM users\")]",
            ))
        }
    };

    let rest: Vec<NestedMeta> = items.collect();
    let opts = StatementOpts::from_list(&rest)?;
    Ok((template, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn template_only() -> darling::Result<()> {
        let (template, opts) = parse(quote!("SELECT 1"))?;
        assert_eq!(template.value(), "SELECT 1");
        assert!(opts.krate.is_none());
        assert!(opts.row.is_none());
        Ok(())
    }

    #[test]
    fn crate_and_row_overrides() -> darling::Result<()> {
        let (_, opts) = parse(quote!("SELECT {id, i64}", crate = "crate::db", row = "User"))?;
        let options = opts.into_options();
        let krate = options.krate;
        assert_eq!(quote!(#krate).to_string(), quote!(crate::db).to_string());
        assert_eq!(options.row.map(|r| r.to_string()), Some("User".to_string()));
        Ok(())
    }

    #[test]
    fn default_crate_path() -> darling::Result<()> {
        let (_, opts) = parse(quote!("SELECT 1"))?;
        let krate = opts.into_options().krate;
        assert_eq!(quote!(#krate).to_string(), quote!(::pgstmt).to_string());
        Ok(())
    }

    #[test]
    fn template_must_come_first() {
        assert!(parse(quote!(row = "User", "SELECT 1")).is_err());
        assert!(parse(quote!()).is_err());
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse(quote!("SELECT 1", table = "users")).is_err());
    }
}
