//! Declaration emitter: turns a [`StatementModel`] into Rust items.

use std::collections::HashSet;

use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{parse_quote, Visibility};

use crate::error::{InterpolationKind, Result, StatementError};
use crate::ident::field_ident;
use crate::model::StatementModel;
use crate::types::TypeRef;

/// Where the generated declarations go.
#[derive(Debug, Clone)]
pub struct Target {
    /// The host struct carrying the statement.
    pub ident: Ident,
    pub vis: Visibility,
    /// Name of the row type.
    pub row: Ident,
    /// Path of the runtime crate, e.g. `::pgstmt`.
    pub krate: syn::Path,
}

impl Target {
    pub fn new(ident: Ident, vis: Visibility, krate: syn::Path, row: Option<Ident>) -> Self {
        let row = row.unwrap_or_else(|| format_ident!("{}Row", ident));
        Target {
            ident,
            vis,
            row,
            krate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub ident: Ident,
    pub ty: TypeRef,
}

/// The generated declaration set for one statement.
#[derive(Debug, Clone)]
pub struct Declarations {
    target: Target,
    pub sql: String,
    /// Row fields in column order; empty for statements returning no rows.
    pub row_fields: Vec<Field>,
    /// Fields added to the host struct, in bind order.
    pub bound_fields: Vec<Field>,
}

impl Declarations {
    /// Checks that every column and bind can become a distinct field, then
    /// captures what is needed for emission.
    pub fn emit(model: &StatementModel, target: Target) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut row_fields = Vec::with_capacity(model.columns.len());
        for column in &model.columns {
            let name = column.field_name();
            let ident = checked_ident(name, InterpolationKind::Column, &column.range)?;
            if !seen.insert(ident.to_string()) {
                return Err(StatementError::DuplicateField {
                    name: name.to_string(),
                    kind: InterpolationKind::Column,
                    range: Some(column.range.clone()),
                });
            }
            row_fields.push(Field {
                ident,
                ty: column.ty.clone(),
            });
        }

        let mut seen = HashSet::new();
        let mut bound_fields = Vec::with_capacity(model.binds.len());
        for bind in &model.binds {
            let ident = checked_ident(&bind.name, InterpolationKind::Bind, &bind.range)?;
            if !seen.insert(ident.to_string()) {
                return Err(StatementError::DuplicateField {
                    name: bind.name.clone(),
                    kind: InterpolationKind::Bind,
                    range: Some(bind.range.clone()),
                });
            }
            bound_fields.push(Field {
                ident,
                ty: bind.ty.clone(),
            });
        }

        Ok(Declarations {
            target,
            sql: model.sql.clone(),
            row_fields,
            bound_fields,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The row struct, or a unit alias when the statement returns no rows.
    pub fn row_type(&self) -> TokenStream {
        let Target { vis, row, krate, .. } = &self.target;
        if self.row_fields.is_empty() {
            return quote! {
                #vis type #row = ();
            };
        }

        let idents = self.row_fields.iter().map(|f| &f.ident);
        let tys = self.row_fields.iter().map(|f| f.ty.to_tokens(krate));
        quote! {
            #[derive(Debug, Clone, PartialEq)]
            #[allow(non_snake_case)]
            #vis struct #row {
                #( #vis #idents: #tys, )*
            }
        }
    }

    /// One named field per bind, to be appended to the host struct.
    pub fn host_fields(&self) -> Vec<syn::Field> {
        let Target { vis, krate, .. } = &self.target;
        self.bound_fields
            .iter()
            .map(|f| {
                let ident = &f.ident;
                let ty = f.ty.to_tokens(krate);
                if ident.to_string().chars().any(|c| c.is_ascii_uppercase()) {
                    parse_quote! {
                        #[allow(non_snake_case)]
                        #vis #ident: #ty
                    }
                } else {
                    parse_quote! { #vis #ident: #ty }
                }
            })
            .collect()
    }

    /// `impl PreparedStatement for Host`.
    pub fn conformance(&self) -> TokenStream {
        let Target {
            ident, row, krate, ..
        } = &self.target;
        let sql = Literal::string(&self.sql);
        let make_bindings = self.make_bindings();
        let decode_row = self.decode_row();

        quote! {
            #[automatically_derived]
            impl #krate::PreparedStatement for #ident {
                type Row = #row;

                const SQL: &'static str = #sql;

                #make_bindings

                #decode_row
            }
        }
    }

    fn make_bindings(&self) -> TokenStream {
        let krate = &self.target.krate;
        let signature = quote! {
            fn make_bindings(
                &self,
            ) -> ::std::result::Result<#krate::sqlx::postgres::PgArguments, #krate::sqlx::error::BoxDynError>
        };

        if self.bound_fields.is_empty() {
            return quote! {
                #signature {
                    ::std::result::Result::Ok(
                        <#krate::sqlx::postgres::PgArguments as ::std::default::Default>::default(),
                    )
                }
            };
        }

        let count = Literal::usize_suffixed(self.bound_fields.len());
        let fields = self.bound_fields.iter().map(|f| &f.ident);
        quote! {
            #signature {
                let mut bindings =
                    <#krate::sqlx::postgres::PgArguments as ::std::default::Default>::default();
                #krate::sqlx::Arguments::reserve(&mut bindings, #count, 0);
                #( #krate::sqlx::Arguments::add(&mut bindings, &self.#fields)?; )*
                ::std::result::Result::Ok(bindings)
            }
        }
    }

    fn decode_row(&self) -> TokenStream {
        let Target { row, krate, .. } = &self.target;
        if self.row_fields.is_empty() {
            return quote! {
                fn decode_row(
                    _row: &#krate::sqlx::postgres::PgRow,
                ) -> ::std::result::Result<Self::Row, #krate::sqlx::Error> {
                    ::std::result::Result::Ok(())
                }
            };
        }

        let decoded = self.row_fields.iter().enumerate().map(|(index, f)| {
            let ident = &f.ident;
            let ty = f.ty.to_tokens(krate);
            let index = Literal::usize_suffixed(index);
            quote! {
                #ident: #krate::sqlx::Row::try_get::<#ty, _>(row, #index)?
            }
        });
        quote! {
            fn decode_row(
                row: &#krate::sqlx::postgres::PgRow,
            ) -> ::std::result::Result<Self::Row, #krate::sqlx::Error> {
                ::std::result::Result::Ok(#row {
                    #( #decoded, )*
                })
            }
        }
    }
}

fn checked_ident(
    name: &str,
    kind: InterpolationKind,
    range: &std::ops::Range<usize>,
) -> Result<Ident> {
    field_ident(name).ok_or_else(|| StatementError::InvalidFieldName {
        name: name.to_string(),
        kind,
        range: range.clone(),
    })
}
