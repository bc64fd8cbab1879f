//! Per-query macro context

use chrono::Duration;

use crate::time::TimeRange;

/// Values a macro handler may read while expanding a single query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// Dashboard time range, already in UTC
    pub time_range: TimeRange,
    /// Sampling interval suggested by the host
    pub interval: Duration,
}

impl QueryContext {
    /// Create a context with a zero interval
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            interval: Duration::zero(),
        }
    }

    /// Set the sampling interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
