//! Convenient imports for typical `qset` usage.
//!
//! ```ignore
//! use qset::prelude::*;
//! ```

pub use crate::{
    Connection, Cursor, Dialect, DocumentOptions, Entity, Expr, FromRow, FromValue, QsError,
    QsResult, QuerySet, Row, SqlFragment, Value,
};
