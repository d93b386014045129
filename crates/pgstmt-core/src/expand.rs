//! Attaching a compiled statement to its host declaration.

use std::collections::HashSet;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens};
use syn::ext::IdentExt;
use syn::{parse_quote, Fields, Item, ItemStruct, LitStr};

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::emit::{Declarations, Target};
use crate::error::{InterpolationKind, StatementError};
use crate::model::compile;

/// Options accepted next to the template.
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Path of the runtime crate in generated code.
    pub krate: syn::Path,
    /// Row type name; `<Host>Row` when unset.
    pub row: Option<Ident>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions {
            krate: parse_quote!(::pgstmt),
            row: None,
        }
    }
}

/// Expands `item` into the host struct with its bound fields, the row type and
/// the `PreparedStatement` impl.
///
/// Either everything is produced or nothing is: the first problem found is
/// returned as a diagnostic.
pub fn expand(
    item: Item,
    template: &LitStr,
    options: &ExpandOptions,
) -> Result<TokenStream, Diagnostic> {
    let mut host = guard(item)?;

    let in_template = |err: StatementError| Diagnostic::from(err).at(template.span());
    let model = compile(&template.value()).map_err(in_template)?;
    let target = Target::new(
        host.ident.clone(),
        host.vis.clone(),
        options.krate.clone(),
        options.row.clone(),
    );
    let decls = Declarations::emit(&model, target).map_err(in_template)?;

    let existing: HashSet<String> = host
        .fields
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|i| i.unraw().to_string()))
        .collect();
    for (field, bind) in decls.bound_fields.iter().zip(&model.binds) {
        if existing.contains(&field.ident.unraw().to_string()) {
            return Err(in_template(StatementError::DuplicateField {
                name: bind.name.clone(),
                kind: InterpolationKind::Bind,
                range: Some(bind.range.clone()),
            }));
        }
    }

    attach(&mut host, decls.host_fields());
    tracing::debug!(
        statement = %host.ident,
        row = %decls.target().row,
        sql = %decls.sql,
        "expanded statement"
    );

    let row_type = decls.row_type();
    let conformance = decls.conformance();
    Ok(quote! {
        #host

        #row_type

        #conformance
    })
}

/// Like [`expand`], but reports a failure to `sink` and hands back `item`
/// untouched.
pub fn expand_with_sink(
    item: Item,
    template: &LitStr,
    options: &ExpandOptions,
    sink: &mut dyn DiagnosticSink,
) -> TokenStream {
    let original = item.to_token_stream();
    match expand(item, template, options) {
        Ok(tokens) => tokens,
        Err(diagnostic) => {
            tracing::debug!(id = %diagnostic.id, "statement rejected");
            sink.emit(diagnostic);
            original
        }
    }
}

fn guard(item: Item) -> Result<ItemStruct, Diagnostic> {
    let introducer = match item {
        Item::Struct(host) => return supported(host),
        Item::Enum(i) => Some(("enum", i.enum_token.span)),
        Item::Union(i) => Some(("union", i.union_token.span)),
        Item::Trait(i) => Some(("trait", i.trait_token.span)),
        Item::Fn(i) => Some(("fn", i.sig.fn_token.span)),
        Item::Impl(i) => Some(("impl", i.impl_token.span)),
        Item::Mod(i) => Some(("mod", i.mod_token.span)),
        Item::Type(i) => Some(("type", i.type_token.span)),
        Item::Const(i) => Some(("const", i.const_token.span)),
        Item::Static(i) => Some(("static", i.static_token.span)),
        Item::Use(i) => Some(("use", i.use_token.span)),
        Item::ExternCrate(i) => Some(("extern crate", i.extern_token.span)),
        Item::ForeignMod(i) => Some(("extern", i.abi.extern_token.span)),
        Item::TraitAlias(i) => Some(("trait", i.trait_token.span)),
        _ => None,
    };

    let err = StatementError::InvalidDeclaration {
        introducer: introducer.map(|(keyword, _)| keyword.to_string()),
    };
    let diagnostic = Diagnostic::from(err).at(Span::call_site());
    Err(match introducer {
        Some((_, span)) => diagnostic.fix_at(span),
        None => diagnostic,
    })
}

fn supported(host: ItemStruct) -> Result<ItemStruct, Diagnostic> {
    let unsupported = |message: &str, span: Span| {
        Diagnostic::from(StatementError::UnsupportedDeclaration {
            message: message.to_string(),
        })
        .at(span)
    };

    if !host.generics.params.is_empty() {
        return Err(unsupported(
            "'#[statement]' does not support generic parameters",
            host.ident.span(),
        ));
    }
    if let Fields::Unnamed(fields) = &host.fields {
        return Err(unsupported(
            "'#[statement]' requires a struct with named fields or a unit struct",
            fields.paren_token.span.join(),
        ));
    }
    Ok(host)
}

fn attach(host: &mut ItemStruct, fields: Vec<syn::Field>) {
    if fields.is_empty() {
        return;
    }
    match &mut host.fields {
        Fields::Named(named) => named.named.extend(fields),
        Fields::Unit => {
            host.fields = Fields::Named(parse_quote!({ #( #fields ),* }));
            host.semi_token = None;
        }
        Fields::Unnamed(_) => {}
    }
}
