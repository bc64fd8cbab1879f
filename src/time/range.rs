//! Query time range
//!
//! Both boundaries are converted to UTC when the range is built, so every
//! consumer sees the same instants regardless of the caller's time zone.

use chrono::{DateTime, TimeZone, Utc};

use super::error::{TimeError, TimeResult};

/// Time range of a single query (both boundaries inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a time range from two instants in any time zone
    pub fn new<Tz: TimeZone>(from: DateTime<Tz>, to: DateTime<Tz>) -> Self {
        Self {
            from: from.with_timezone(&Utc),
            to: to.with_timezone(&Utc),
        }
    }

    /// Parse both boundaries from RFC 3339 strings
    pub fn parse_rfc3339(from: &str, to: &str) -> TimeResult<Self> {
        Ok(Self::new(parse_instant(from)?, parse_instant(to)?))
    }

    /// Start of the range
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// End of the range
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Start of the range as microseconds since the Unix epoch
    pub fn from_micros(&self) -> i64 {
        self.from.timestamp_micros()
    }

    /// End of the range as microseconds since the Unix epoch
    pub fn to_micros(&self) -> i64 {
        self.to.timestamp_micros()
    }
}

fn parse_instant(input: &str) -> TimeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimeError::InvalidTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        })
}
