use pgstmt_core::{expand_with_sink, Diagnostic};
use proc_macro2::TokenStream;

use crate::opts;

pub fn expand(args: TokenStream, input: TokenStream) -> Result<TokenStream, darling::Error> {
    let (template, opts) = opts::parse(args)?;
    let item: syn::Item = syn::parse2(input)?;

    // on failure the item comes back untouched, followed by the error
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut ts = expand_with_sink(item, &template, &opts.into_options(), &mut diagnostics);
    for diagnostic in &diagnostics {
        ts.extend(diagnostic.to_compile_error());
    }
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn expands_a_struct() -> darling::Result<()> {
        let ts = expand(
            quote!("SELECT {id, i64} FROM users WHERE {bind: name, String} = name"),
            quote!(pub struct FindUser;),
        )?;
        let file: syn::File = syn::parse2(ts)?;
        assert_eq!(file.items.len(), 3);
        Ok(())
    }

    #[test]
    fn failure_keeps_the_item_and_adds_errors() -> darling::Result<()> {
        let ts = expand(quote!("SELECT {id, Widget}"), quote!(struct FindUser {}))?;
        let out = ts.to_string();
        assert!(out.starts_with("struct FindUser"), "{out}");
        assert!(out.contains("compile_error"), "{out}");
        assert!(out.contains("Cannot parse type for column with name 'id'"), "{out}");
        assert!(!out.contains("PreparedStatement"), "{out}");
        Ok(())
    }

    #[test]
    fn invalid_declaration_adds_help() -> darling::Result<()> {
        let out = expand(quote!("SELECT 1"), quote!(enum Users {}))?.to_string();
        assert!(out.contains("help: Replace 'enum' with 'struct'"), "{out}");
        Ok(())
    }
}
