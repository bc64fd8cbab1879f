//! Sample-by interval formatting
//!
//! Renders a sampling interval as the compact bucket token accepted by
//! QuestDB's `SAMPLE BY` clause (`d`, `h`, `s`, `T` for milliseconds).
//! Coarser units win when the interval is an exact multiple; hours and
//! seconds are truncated, never rounded.

use chrono::Duration;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res, value},
    sequence::pair,
    IResult,
};

use super::error::{TimeError, TimeResult};

/// Format an interval as a `SAMPLE BY` bucket size
///
/// ```
/// use chrono::Duration;
/// use questframe::time::format_sample_by;
///
/// assert_eq!(format_sample_by(Duration::hours(24)), "1d");
/// assert_eq!(format_sample_by(Duration::minutes(90)), "1h");
/// assert_eq!(format_sample_by(Duration::zero()), "1T");
/// ```
pub fn format_sample_by(interval: Duration) -> String {
    let hours = interval.num_hours().max(0);
    let seconds = interval.num_seconds().max(0);

    if hours > 0 {
        let exact_hours = interval == Duration::hours(hours);
        if hours >= 24 && exact_hours && hours % 24 == 0 {
            return format!("{}d", hours / 24);
        }
        return format!("{}h", hours);
    }

    if seconds > 0 {
        return format!("{}s", seconds);
    }

    // num_milliseconds truncates toward zero; anything below 1ms is clamped.
    format!("{}T", interval.num_milliseconds().max(1))
}

/// Parse an interval such as `30s`, `500ms`, `15m`, `1h` or `7d`
///
/// `T` is accepted as a millisecond suffix so formatted bucket sizes parse back.
pub fn parse_interval(input: &str) -> TimeResult<Duration> {
    match all_consuming(parse_duration)(input.trim()) {
        Ok((_, interval)) => Ok(interval),
        Err(_) => Err(TimeError::InvalidInterval(input.to_string())),
    }
}

fn parse_duration(input: &str) -> IResult<&str, Duration> {
    map_res(
        pair(
            map_res(digit1, |s: &str| s.parse::<i64>()),
            alt((
                value(1i64, alt((tag("ms"), tag("T")))),
                value(1_000i64, tag("s")),
                value(60_000i64, tag("m")),
                value(3_600_000i64, tag("h")),
                value(86_400_000i64, tag("d")),
            )),
        ),
        |(count, unit_ms)| {
            count
                .checked_mul(unit_ms)
                .map(Duration::milliseconds)
                .ok_or("interval overflow")
        },
    )(input)
}
