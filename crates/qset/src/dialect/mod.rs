//! Pagination dialects.
//!
//! Engines differ in how a page of rows is requested:
//!
//! | dialect                | paging syntax                         |
//! |------------------------|---------------------------------------|
//! | `Default`              | `LIMIT t OFFSET s`                    |
//! | `WindowedTop`          | `TOP (t)` / `OFFSET s ROWS FETCH ...` |
//! | `RowNumberEmulation`   | `ROW_NUMBER() OVER (...)` sub-query   |
//!
//! The dialect of a connection is resolved once per [`ConnectionKind`] and
//! kept in a process-wide [`DialectCache`].
//!
//! [`ConnectionKind`]: crate::ConnectionKind

mod cache;


pub use cache::DialectCache;

use crate::error::{QsError, QsResult};
use std::fmt;

/// Target-engine pagination capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `LIMIT` / `OFFSET`.
    Default,
    /// `TOP (n)` and `OFFSET ... FETCH`, no `LIMIT`.
    WindowedTop,
    /// No native paging; emulated with a row-numbering sub-query.
    RowNumberEmulation,
}

const PROVIDERS: &[(&str, Dialect)] = &[
    ("postgres", Dialect::Default),
    ("postgresql", Dialect::Default),
    ("sqlite", Dialect::Default),
    ("mysql", Dialect::Default),
    ("mariadb", Dialect::Default),
    ("duckdb", Dialect::Default),
    ("sqlserver", Dialect::WindowedTop),
    ("mssql", Dialect::WindowedTop),
    ("sqlserver2012", Dialect::WindowedTop),
    ("oracle", Dialect::RowNumberEmulation),
    ("db2", Dialect::RowNumberEmulation),
    ("sqlserver2005", Dialect::RowNumberEmulation),
];

impl Dialect {
    /// Map a provider name to its dialect (ASCII case-insensitive).
    pub fn from_provider(provider: &str) -> QsResult<Self> {
        let provider = provider.trim();
        PROVIDERS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(provider))
            .map(|(_, d)| *d)
            .ok_or_else(|| {
                QsError::configuration(format!("unrecognized SQL provider '{provider}'"))
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Default => "default",
            Dialect::WindowedTop => "windowed_top",
            Dialect::RowNumberEmulation => "row_number_emulation",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
