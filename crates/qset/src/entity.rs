//! Entity descriptors.
//!
//! An [`Entity`] tells a query set which table to read and which persistent
//! columns to project. It is usually derived:
//!
//! ```ignore
//! #[derive(Entity, FromRow)]
//! #[qset(table = "users")]
//! struct User {
//!     #[qset(key)]
//!     id: i64,
//!     #[qset(column = "user_name")]
//!     name: String,
//!     #[qset(version)]
//!     row_version: i32,
//! }
//! ```

/// Metadata for one persistent column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name in storage.
    pub storage_name: &'static str,
    /// Name the column is exposed under (the field name).
    pub logical_name: &'static str,
    pub is_key: bool,
    /// Computed by the database.
    pub is_computed: bool,
    /// Optimistic-concurrency version column.
    pub is_version: bool,
}

impl ColumnMeta {
    pub const fn new(storage_name: &'static str, logical_name: &'static str) -> Self {
        Self {
            storage_name,
            logical_name,
            is_key: false,
            is_computed: false,
            is_version: false,
        }
    }

    /// Whether the column must be aliased to surface its logical name.
    pub fn is_renamed(&self) -> bool {
        self.storage_name != self.logical_name
    }
}

/// Descriptor of a persistent type.
pub trait Entity {
    /// Table (possibly schema-qualified) backing the entity.
    fn table_name() -> &'static str;

    /// Persistent columns, in projection order.
    fn persistent_columns() -> &'static [ColumnMeta];

    /// Key columns.
    fn key_columns() -> Vec<&'static ColumnMeta> {
        Self::persistent_columns().iter().filter(|c| c.is_key).collect()
    }
}
