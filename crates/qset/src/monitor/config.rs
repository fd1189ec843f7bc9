use std::time::Duration;

/// Settings for an [`InstrumentedConnection`](super::InstrumentedConnection).
///
/// Monitoring is off by default; hooks run either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Completions slower than this also trigger `on_slow_query`.
    pub slow_query_threshold: Option<Duration>,
    pub monitoring_enabled: bool,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    pub fn disable_monitoring(mut self) -> Self {
        self.monitoring_enabled = false;
        self
    }

    pub(crate) fn is_slow(&self, duration: Duration) -> bool {
        self.slow_query_threshold.is_some_and(|t| duration > t)
    }
}
