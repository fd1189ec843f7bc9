use crate::sql::{starts_with_keyword, strip_sql_prefix};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Shape of an executed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Row-returning `SELECT` (or `WITH ... SELECT`).
    Select,
    /// A `SELECT COUNT(*)` produced by `QuerySet::count`.
    Count,
    /// Anything else (raw statements, DDL).
    Other,
}

impl QueryType {
    /// Classify a statement by its leading keyword, ignoring comments and
    /// whitespace.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            let rest = trimmed["SELECT".len()..].trim_start();
            if starts_with_keyword(rest, "COUNT(*)") {
                QueryType::Count
            } else {
                QueryType::Select
            }
        } else if starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else {
            QueryType::Other
        }
    }
}

/// What a hook or monitor knows about one execution.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Statement text sent to the connection.
    pub sql: String,
    /// Number of bound parameters.
    pub param_count: usize,
    pub query_type: QueryType,
    /// `Connection::provider_name` of the wrapped connection.
    pub provider: String,
    /// Low-cardinality structured fields.
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    pub fn new(sql: impl Into<String>, param_count: usize) -> Self {
        let sql = sql.into();
        Self {
            query_type: QueryType::from_sql(&sql),
            sql,
            param_count,
            provider: String::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of an execution as reported to monitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Rows read from the cursor before it was exhausted or dropped.
    Rows(usize),
    /// The statement or the cursor failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(1) => f.write_str("1 row"),
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Receives timing for every statement run through an
/// [`InstrumentedConnection`](super::InstrumentedConnection).
///
/// A statement completes when its cursor is exhausted, fails, or is dropped,
/// so the reported duration covers fetching as well as execution.
pub trait QueryMonitor: Send + Sync {
    fn on_query_start(&self, _ctx: &QueryContext) {}

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called after `on_query_complete` when the configured slow threshold is
    /// exceeded.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}

/// Decision returned by [`QueryHook::before_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Execute this text instead. Parameters are left untouched.
    ModifySql(String),
    /// Fail the execution with [`QsError::Aborted`](crate::QsError::Aborted).
    Abort(String),
}

/// Inspects (and may rewrite or veto) statements before they run.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Runs before monitors see the completion.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
