//! # qset
//!
//! Immutable, dialect-aware query sets with lazy cursor projection.
//!
//! ## Features
//!
//! - **Composable**: `filter`, `order_by`, `skip`, `take`, `select`, `union`
//!   each return a new [`QuerySet`]; the original stays reusable
//! - **Dialect-aware paging**: `LIMIT/OFFSET`, `TOP`/`OFFSET..FETCH`, or a
//!   `ROW_NUMBER()` emulation, chosen once per connection type
//! - **Parameterized**: values only ever travel as bound parameters
//! - **Lazy projection**: rows become objects ([`RowIter`]) or a hierarchical
//!   document ([`DocumentReader`]) one at a time
//! - **Monitoring**: hooks and timing around every statement
//!
//! ## Query sets
//!
//! ```ignore
//! use qset::{QuerySet, Row};
//!
//! let adults = QuerySet::table("people")
//!     .filter("age >= {0}", [18])
//!     .order_by("name")
//!     .skip(20)
//!     .take(10);
//!
//! for person in adults.iter(&conn)? {
//!     let person: Row = person?;
//!     println!("{}", person.get::<String>("name")?);
//! }
//! let total = adults.count(&conn)?;
//! ```
//!
//! ## Documents
//!
//! ```ignore
//! use qset::{DocumentOptions, document::to_xml_string};
//!
//! let mut reader = QuerySet::table("orders")
//!     .select::<qset::Row>(&["id", "customer_name AS \"Customer$Name\""])
//!     .to_document(&conn, DocumentOptions::new().with_root_name("orders"))?;
//! let xml = to_xml_string(&mut reader)?;
//! ```

// Lets derive output refer to `::qset` from inside this crate's own tests.
extern crate self as qset;

pub mod connection;
pub mod cursor;
pub mod dialect;
pub mod document;
pub mod entity;
pub mod error;
pub mod expr;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod queryset;
pub mod row;
pub mod sql;
pub mod value;

pub use connection::{Connection, ConnectionKind, Statement};
pub use cursor::{Cursor, MaskedCursor, MemoryCursor};
pub use dialect::{Dialect, DialectCache};
pub use document::{
    DocumentNode, DocumentOptions, DocumentReader, NullHandling, ReaderState, TypeAnnotation,
};
pub use entity::{ColumnMeta, Entity};
pub use error::{QsError, QsResult};
pub use expr::Expr;
pub use ident::{Ident, IdentPart, IntoIdent};
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedConnection, MonitorConfig,
    NoopMonitor, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryStats, QueryType,
    StatsMonitor,
};
pub use queryset::{CompiledQuery, Projection, QuerySet, RowIter};
pub use row::{FromRow, Row};
pub use sql::{PlaceholderStyle, Sql, SqlFragment};
pub use value::{FromValue, Value, ValueKind};

#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;

#[cfg(feature = "derive")]
pub use qset_derive::{Entity, FromRow};
