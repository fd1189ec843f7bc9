use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

/// Aggregates counters over all completed statements.
///
/// Counters are relaxed atomics, so a [`stats`](Self::stats) snapshot taken
/// while statements complete may mix values from before and after one event.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    counters: [AtomicU64; Counter::LEN],
    slowest_query: Mutex<Option<String>>,
}

#[derive(Clone, Copy)]
enum Counter {
    Total,
    Failed,
    Slow,
    Selects,
    Counts,
    Rows,
    Nanos,
    MaxNanos,
}

impl Counter {
    const LEN: usize = Counter::MaxNanos as usize + 1;
}

/// Snapshot of a [`StatsMonitor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub total_queries: u64,
    pub failed_queries: u64,
    pub slow_queries: u64,
    /// Row-returning selects.
    pub select_count: u64,
    /// `COUNT(*)` statements.
    pub count_count: u64,
    /// Rows handed out by completed cursors.
    pub rows_read: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
    pub slowest_query: Option<String>,
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, counter: Counter) -> u64 {
        self.counters[counter as usize].load(Ordering::Relaxed)
    }

    fn bump(&self, counter: Counter, n: u64) {
        // Saturate instead of wrapping.
        let _ = self.counters[counter as usize].fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |v| Some(v.saturating_add(n)),
        );
    }

    fn slowest(&self) -> MutexGuard<'_, Option<String>> {
        self.slowest_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.get(Counter::Total),
            failed_queries: self.get(Counter::Failed),
            slow_queries: self.get(Counter::Slow),
            select_count: self.get(Counter::Selects),
            count_count: self.get(Counter::Counts),
            rows_read: self.get(Counter::Rows),
            total_duration: Duration::from_nanos(self.get(Counter::Nanos)),
            max_duration: Duration::from_nanos(self.get(Counter::MaxNanos)),
            slowest_query: self.slowest().clone(),
        }
    }

    pub fn reset(&self) {
        self.counters
            .iter()
            .for_each(|c| c.store(0, Ordering::Relaxed));
        *self.slowest() = None;
    }
}

impl QueryMonitor for StatsMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.bump(Counter::Total, 1);
        self.bump(Counter::Nanos, nanos);

        match ctx.query_type {
            QueryType::Select => self.bump(Counter::Selects, 1),
            QueryType::Count => self.bump(Counter::Counts, 1),
            QueryType::Other => {}
        }
        match result {
            QueryResult::Rows(n) => {
                self.bump(Counter::Rows, u64::try_from(*n).unwrap_or(u64::MAX))
            }
            QueryResult::Error(_) => self.bump(Counter::Failed, 1),
        }

        let previous_max =
            self.counters[Counter::MaxNanos as usize].fetch_max(nanos, Ordering::Relaxed);
        if nanos > previous_max {
            *self.slowest() = Some(ctx.sql.clone());
        }
    }

    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {
        self.bump(Counter::Slow, 1);
    }
}

/// Fans every event out to several monitors, in insertion order.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.add_arc(Arc::new(monitor))
    }

    pub fn add_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        for monitor in &self.monitors {
            monitor.on_query_start(ctx);
        }
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, result);
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        for monitor in &self.monitors {
            monitor.on_slow_query(ctx, duration);
        }
    }
}

/// Runs hooks in sequence.
///
/// Each hook sees the text produced by the ones before it; the first `Abort`
/// wins and later hooks are skipped.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_arc(Arc::new(hook))
    }

    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let mut current = ctx.clone();
        for hook in &self.hooks {
            match hook.before_query(&current) {
                HookAction::Continue => {}
                HookAction::ModifySql(sql) => {
                    current.query_type = QueryType::from_sql(&sql);
                    current.sql = sql;
                }
                abort @ HookAction::Abort(_) => return abort,
            }
        }
        if current.sql != ctx.sql {
            HookAction::ModifySql(current.sql)
        } else {
            HookAction::Continue
        }
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, result);
        }
    }
}
