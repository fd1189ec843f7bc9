use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook, QueryResult};
use std::borrow::Cow;
use std::time::Duration;
use tracing::Level;

// `tracing` macros need the level at compile time.
macro_rules! event_at {
    ($level:expr, $($body:tt)*) => {
        match $level {
            Level::TRACE => tracing::trace!($($body)*),
            Level::DEBUG => tracing::debug!($($body)*),
            Level::INFO => tracing::info!($($body)*),
            Level::WARN => tracing::warn!($($body)*),
            Level::ERROR => tracing::error!($($body)*),
        }
    };
}

/// Logs statements under the `qset.sql` target.
///
/// The statement text goes out from `before_query`, so it is logged even with
/// monitoring disabled. Completions need monitoring on.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    pub level: Level,
    /// Byte limit for the logged text; `None` logs it whole.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    pub fn level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    pub fn max_sql_length(self, len: usize) -> Self {
        Self {
            max_sql_length: Some(len),
            ..self
        }
    }

    pub fn no_truncate(self) -> Self {
        Self {
            max_sql_length: None,
            ..self
        }
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let Some(limit) = self.max_sql_length.filter(|&limit| sql.len() > limit) else {
            return Cow::Borrowed(sql);
        };
        Cow::Owned(format!("{}...", truncate_sql_bytes(sql, limit)))
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let text = self.truncate_sql(&ctx.sql);
        event_at!(
            self.level,
            target: "qset.sql",
            kind = ?ctx.query_type,
            provider = %ctx.provider,
            params = ctx.param_count,
            fields = ?ctx.fields,
            "{text}",
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, elapsed: Duration, result: &QueryResult) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        event_at!(
            self.level,
            target: "qset.sql",
            kind = ?ctx.query_type,
            elapsed_us = micros,
            %result,
            "done",
        );
    }
}
