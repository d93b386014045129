//! Turning manifest statements into one formatted Rust module.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use heck::ToUpperCamelCase;
use pgstmt_core::{expand, Diagnostic, ExpandOptions};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{parse_quote, LitStr};
use tracing::{debug, info};

use crate::config::{GeneratorSettings, StatementConfig};

const HEADER: &str = "// @generated by pgstmt-gen. Do not edit by hand.\n\n";

/// A statement that could not be generated.
#[derive(Debug, Clone)]
pub struct Failure {
    pub statement: String,
    pub template: String,
    pub diagnostic: Diagnostic,
}

#[derive(Debug)]
pub enum Outcome {
    /// Every statement compiled; the formatted module source.
    Module(String),
    /// At least one statement failed; nothing should be written.
    Rejected(Vec<Failure>),
}

pub struct Generator {
    krate: syn::Path,
    vis: syn::Visibility,
    derives: Vec<syn::Path>,
    header: bool,
}

impl Generator {
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self> {
        let krate = syn::parse_str(&settings.crate_path)
            .with_context(|| format!("invalid generator.crate_path `{}`", settings.crate_path))?;
        let vis = syn::parse_str(&settings.visibility)
            .with_context(|| format!("invalid generator.visibility `{}`", settings.visibility))?;
        let derives = settings
            .derives
            .iter()
            .map(|d| syn::parse_str(d).with_context(|| format!("invalid derive `{d}`")))
            .collect::<Result<Vec<syn::Path>>>()?;

        Ok(Self {
            krate,
            vis,
            derives,
            header: settings.header,
        })
    }

    /// Compiles every statement. Each statement stops at its first problem;
    /// failures of different statements are all collected.
    pub fn generate(&self, statements: &[StatementConfig]) -> Result<Outcome> {
        let mut names = HashSet::new();
        let mut items = Vec::with_capacity(statements.len());
        let mut failures = Vec::new();

        for statement in statements {
            let ident = struct_ident(&statement.name)?;
            let row = row_ident(statement)?;
            let row_name = row
                .as_ref()
                .map_or_else(|| format!("{ident}Row"), Ident::to_string);
            if !names.insert(ident.to_string()) {
                bail!(
                    "struct `{ident}` of statement `{}` clashes with another generated type",
                    statement.name
                );
            }
            if !names.insert(row_name.clone()) {
                bail!(
                    "row type `{row_name}` of statement `{}` clashes with another generated type",
                    statement.name
                );
            }

            match self.statement(ident, row, statement) {
                Ok(tokens) => {
                    info!(statement = %statement.name, "generated statement");
                    items.push(tokens);
                }
                Err(diagnostic) => {
                    debug!(statement = %statement.name, id = %diagnostic.id, "statement rejected");
                    failures.push(Failure {
                        statement: statement.name.clone(),
                        template: statement.sql.clone(),
                        diagnostic,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Ok(Outcome::Rejected(failures));
        }
        self.module(items).map(Outcome::Module)
    }

    fn statement(
        &self,
        ident: Ident,
        row: Option<Ident>,
        statement: &StatementConfig,
    ) -> std::result::Result<TokenStream, Diagnostic> {
        let vis = &self.vis;
        let docs: Vec<String> = statement
            .doc
            .iter()
            .flat_map(|doc| doc.lines())
            .map(|line| format!(" {line}"))
            .collect();
        let derives = (!self.derives.is_empty()).then(|| {
            let derives = &self.derives;
            quote!(#[derive(#( #derives ),*)])
        });
        let item: syn::Item = parse_quote! {
            #( #[doc = #docs] )*
            #derives
            #vis struct #ident;
        };

        let options = ExpandOptions {
            krate: self.krate.clone(),
            row,
        };
        let template = LitStr::new(&statement.sql, Span::call_site());
        expand(item, &template, &options)
    }

    fn module(&self, items: Vec<TokenStream>) -> Result<String> {
        let file: syn::File =
            syn::parse2(quote!(#( #items )*)).context("generated code is not a valid module")?;
        let body = prettyplease::unparse(&file);
        if self.header {
            Ok(format!("{HEADER}{body}"))
        } else {
            Ok(body)
        }
    }
}

fn struct_ident(name: &str) -> Result<Ident> {
    let camel = name.to_upper_camel_case();
    syn::parse_str::<Ident>(&camel)
        .with_context(|| format!("statement name `{name}` does not make a valid struct name"))
}

fn row_ident(statement: &StatementConfig) -> Result<Option<Ident>> {
    statement
        .row
        .as_deref()
        .map(|row| {
            syn::parse_str::<Ident>(row)
                .with_context(|| format!("invalid row name `{row}` for `{}`", statement.name))
        })
        .transpose()
}
