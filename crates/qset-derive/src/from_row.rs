//! `#[derive(FromRow)]`

use crate::attrs::{field_attr, named_fields, option_inner};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "FromRow")?;

    let mut extracts = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = field_attr(field)?;
        if attr.skip {
            extracts.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        // Entity projections alias renamed columns to the field name, so the
        // field name is tried before the storage name.
        let logical = ident.unraw().to_string();
        let lookup = match &attr.column {
            Some(column) if *column != logical => quote! {
                row.index_of(#logical).or_else(|| row.index_of(#column))
            },
            _ => quote! { row.index_of(#logical) },
        };
        let missing = if option_inner(&field.ty).is_some() {
            quote! { ::core::option::Option::None }
        } else {
            quote! { row.get(#logical)? }
        };

        extracts.push(quote! {
            #ident: match #lookup {
                ::core::option::Option::Some(i) => row.get_idx(i)?,
                ::core::option::Option::None => #missing,
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::qset::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::qset::Row) -> ::qset::QsResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#extracts),*
                })
            }
        }
    })
}
