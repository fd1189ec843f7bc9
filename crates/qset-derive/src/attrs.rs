//! `#[qset(...)]` attribute parsing shared by both derives.

use syn::parse::{Parse, ParseStream};
use syn::{DeriveInput, Result, Token};

/// Field-level options: `#[qset(column = "...", key, computed, version, skip)]`.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub key: bool,
    pub computed: bool,
    pub version: bool,
    pub skip: bool,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "key" => attr.key = true,
                "computed" => attr.computed = true,
                "version" => attr.version = true,
                "skip" => attr.skip = true,
                "column" => {
                    let _: Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown qset field attribute `{other}`"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// Merge every `#[qset(...)]` on a field.
pub(crate) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("qset") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
        merged.key |= parsed.key;
        merged.computed |= parsed.computed;
        merged.version |= parsed.version;
        merged.skip |= parsed.skip;
    }
    Ok(merged)
}

/// Struct-level `#[qset(table = "...")]`, if present.
pub(crate) fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("qset") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: syn::LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unknown qset container attribute"))
            }
        })?;
    }
    Ok(table)
}

/// Named fields of a struct, or an error naming the derive.
pub(crate) fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<syn::Field, Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// `Option<T>` → `T`.
pub(crate) fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}
