use super::config::MonitorConfig;
use super::monitors::{CompositeHook, NoopMonitor};
use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryType};
use crate::connection::{Connection, ConnectionKind, Statement};
use crate::cursor::Cursor;
use crate::dialect::Dialect;
use crate::error::{QsError, QsResult};
use crate::sql::{PlaceholderStyle, Sql};
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`Connection`] wrapper that runs hooks before each statement and reports
/// timing to a monitor.
///
/// Everything except `execute` is delegated, including `kind`, so the wrapped
/// connection shares the dialect cache entry of the inner one.
///
/// ```rust,ignore
/// use qset::monitor::{InstrumentedConnection, MonitorConfig, StatsMonitor};
///
/// let stats = Arc::new(StatsMonitor::new());
/// let conn = InstrumentedConnection::new(conn)
///     .with_config(MonitorConfig::new().enable_monitoring())
///     .with_monitor_arc(stats.clone());
/// let n = QuerySet::table("users").count(&conn)?;
/// ```
pub struct InstrumentedConnection<C> {
    inner: C,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
}

impl<C: Connection> InstrumentedConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            monitor: Arc::new(NoopMonitor),
            hook: None,
            config: MonitorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_monitor<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.with_monitor_arc(Arc::new(monitor))
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Replace the hook.
    pub fn with_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.with_hook_arc(Arc::new(hook))
    }

    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Chain a hook after the existing one.
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn apply_hook(&self, ctx: &mut QueryContext) -> QsResult<()> {
        let Some(hook) = &self.hook else {
            return Ok(());
        };
        match hook.before_query(ctx) {
            HookAction::Continue => Ok(()),
            HookAction::ModifySql(sql) => {
                ctx.query_type = QueryType::from_sql(&sql);
                ctx.sql = sql;
                Ok(())
            }
            HookAction::Abort(reason) => Err(QsError::Aborted(reason)),
        }
    }
}

/// Deliver a completion to the hook, the monitor and, past the threshold,
/// the slow-query callback.
fn report(
    config: &MonitorConfig,
    monitor: &dyn QueryMonitor,
    hook: Option<&dyn QueryHook>,
    ctx: &QueryContext,
    duration: Duration,
    result: &QueryResult,
) {
    if !config.monitoring_enabled {
        return;
    }
    if let Some(hook) = hook {
        hook.after_query(ctx, duration, result);
    }
    monitor.on_query_complete(ctx, duration, result);
    if config.is_slow(duration) {
        monitor.on_slow_query(ctx, duration);
    }
}

impl<C: Connection> Connection for InstrumentedConnection<C> {
    fn kind(&self) -> ConnectionKind {
        self.inner.kind()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn dialect(&self) -> QsResult<Dialect> {
        self.inner.dialect()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.inner.placeholder_style()
    }

    fn quote_identifier(&self, name: &str) -> String {
        self.inner.quote_identifier(name)
    }

    fn compile(&self, sql: &Sql) -> Statement {
        self.inner.compile(sql)
    }

    fn execute(&self, statement: &Statement) -> QsResult<Box<dyn Cursor + '_>> {
        let mut ctx = QueryContext::new(statement.text.as_str(), statement.params.len())
            .with_provider(self.inner.provider_name());
        self.apply_hook(&mut ctx)?;

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = if ctx.sql == statement.text {
            self.inner.execute(statement)
        } else {
            let rewritten = Statement::new(ctx.sql.clone(), statement.params.clone());
            self.inner.execute(&rewritten)
        };

        match result {
            Ok(cursor) if self.config.monitoring_enabled => Ok(Box::new(MonitoredCursor {
                inner: cursor,
                monitor: Arc::clone(&self.monitor),
                hook: self.hook.clone(),
                config: self.config.clone(),
                ctx,
                start,
                rows: 0,
                finished: false,
            })),
            Ok(cursor) => Ok(cursor),
            Err(e) => {
                report(
                    &self.config,
                    self.monitor.as_ref(),
                    self.hook.as_deref(),
                    &ctx,
                    start.elapsed(),
                    &QueryResult::error(e.to_string()),
                );
                Err(e)
            }
        }
    }
}

/// Counts rows and reports the completion once: on exhaustion, on the first
/// error, or when dropped early.
struct MonitoredCursor<'c> {
    inner: Box<dyn Cursor + 'c>,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
    ctx: QueryContext,
    start: Instant,
    rows: usize,
    finished: bool,
}

impl MonitoredCursor<'_> {
    fn finish(&mut self, dropped: bool, err: Option<&QsError>) {
        if self.finished {
            return;
        }
        self.finished = true;
        if dropped {
            self.ctx
                .fields
                .insert("dropped".to_string(), "true".to_string());
        }
        let result = match err {
            None => QueryResult::Rows(self.rows),
            Some(e) => QueryResult::error(e.to_string()),
        };
        report(
            &self.config,
            self.monitor.as_ref(),
            self.hook.as_deref(),
            &self.ctx,
            self.start.elapsed(),
            &result,
        );
    }
}

impl Cursor for MonitoredCursor<'_> {
    fn advance(&mut self) -> QsResult<bool> {
        match self.inner.advance() {
            Ok(true) => {
                self.rows += 1;
                Ok(true)
            }
            Ok(false) => {
                self.finish(false, None);
                Ok(false)
            }
            Err(e) => {
                self.finish(false, Some(&e));
                Err(e)
            }
        }
    }

    fn field_count(&self) -> usize {
        self.inner.field_count()
    }

    fn name(&self, ordinal: usize) -> &str {
        self.inner.name(ordinal)
    }

    fn is_null(&self, ordinal: usize) -> bool {
        self.inner.is_null(ordinal)
    }

    fn value(&self, ordinal: usize) -> QsResult<Value> {
        self.inner.value(ordinal)
    }
}

impl Drop for MonitoredCursor<'_> {
    fn drop(&mut self) {
        self.finish(true, None);
    }
}
