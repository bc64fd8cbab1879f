//! Query Time Context
//!
//! Per-query time values handed to the macro engine:
//!
//! - **TimeRange**: the dashboard time window, normalized to UTC
//! - **Interval**: the sampling interval, rendered as a `SAMPLE BY` bucket size

mod error;
mod interval;
mod range;

pub use error::{TimeError, TimeResult};
pub use interval::{format_sample_by, parse_interval};
pub use range::TimeRange;
