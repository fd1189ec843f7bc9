//! Statement hooks and execution monitoring.
//!
//! [`InstrumentedConnection`] wraps any [`Connection`](crate::Connection):
//! a [`QueryHook`] sees each statement before it runs (and may rewrite or
//! abort it), and a [`QueryMonitor`] receives the completion once the
//! returned cursor is exhausted, fails or is dropped.
//!
//! ```rust,ignore
//! use qset::monitor::{InstrumentedConnection, MonitorConfig, StatsMonitor, TracingSqlHook};
//! use std::time::Duration;
//!
//! let conn = InstrumentedConnection::new(conn)
//!     .with_config(
//!         MonitorConfig::new()
//!             .with_slow_query_threshold(Duration::from_millis(200))
//!             .enable_monitoring(),
//!     )
//!     .with_monitor(StatsMonitor::new())
//!     .with_hook(TracingSqlHook::new());
//! ```

mod config;
mod instrumented;
mod monitors;
mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedConnection;
pub use monitors::{CompositeHook, CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryType};

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

/// Longest prefix of `sql` within `max_bytes` that ends on a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
