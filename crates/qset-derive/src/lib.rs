//! Derive macros for qset
//!
//! Provides `#[derive(FromRow)]` and `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;
mod from_row;

/// Derive `FromRow` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use qset::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[qset(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// Each field is read from the column named after it, falling back to
/// `#[qset(column = "...")]`. `Option` fields whose column is absent become
/// `None`; `#[qset(skip)]` fields take `Default::default()`.
#[proc_macro_derive(FromRow, attributes(qset))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive the `Entity` descriptor for a struct.
///
/// # Example
///
/// ```ignore
/// use qset::Entity;
///
/// #[derive(Entity)]
/// #[qset(table = "users")]
/// struct User {
///     #[qset(key)]
///     user_id: i64,
///     #[qset(column = "user_name")]
///     name: String,
///     #[qset(version)]
///     row_version: i32,
/// }
/// ```
///
/// # Attributes
///
/// - `#[qset(table = "name")]`: backing table (default: snake_case type name)
/// - `#[qset(column = "name")]`: storage column, aliased to the field name
/// - `#[qset(key)]`, `#[qset(computed)]`, `#[qset(version)]`: column flags
/// - `#[qset(skip)]`: not persistent
#[proc_macro_derive(Entity, attributes(qset))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
