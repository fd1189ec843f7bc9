//! `#[derive(Entity)]`

use crate::attrs::{field_attr, named_fields, table_name};
use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Entity")?;

    let table = match table_name(&input)? {
        Some(table) => table,
        None => name.unraw().to_string().to_snake_case(),
    };

    let mut columns = Vec::with_capacity(fields.len());
    let mut has_version = false;
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = field_attr(field)?;
        if attr.skip {
            continue;
        }
        if attr.version {
            if has_version {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[qset(version)]",
                ));
            }
            has_version = true;
        }

        let logical = ident.unraw().to_string();
        let storage = attr.column.unwrap_or_else(|| logical.clone());
        let (key, computed, version) = (attr.key, attr.computed, attr.version);
        columns.push(quote! {
            ::qset::ColumnMeta {
                storage_name: #storage,
                logical_name: #logical,
                is_key: #key,
                is_computed: #computed,
                is_version: #version,
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::qset::Entity for #name #ty_generics #where_clause {
            fn table_name() -> &'static str {
                #table
            }

            fn persistent_columns() -> &'static [::qset::ColumnMeta] {
                const COLUMNS: &[::qset::ColumnMeta] = &[#(#columns),*];
                COLUMNS
            }
        }
    })
}
