//! Built-in QuestDB macros
//!
//! Timestamps are rendered as `cast(<micros> as timestamp)` literals where
//! `<micros>` is the UTC instant in whole microseconds since the epoch.

use super::context::QueryContext;
use super::error::{MacroError, MacroResult};
use crate::time::format_sample_by;

/// `$__fromTime`: start of the query time range as a timestamp literal
pub fn from_time(ctx: &QueryContext, _args: &[String]) -> MacroResult<String> {
    Ok(timestamp_literal(ctx.time_range.from_micros()))
}

/// `$__toTime`: end of the query time range as a timestamp literal
pub fn to_time(ctx: &QueryContext, _args: &[String]) -> MacroResult<String> {
    Ok(timestamp_literal(ctx.time_range.to_micros()))
}

/// `$__timeFilter(column)`: inclusive range predicate on `column`
pub fn time_filter(ctx: &QueryContext, args: &[String]) -> MacroResult<String> {
    let [column] = args else {
        return Err(MacroError::BadArgumentCount {
            macro_name: "timeFilter".to_string(),
            expected: 1,
            received: args.len(),
        });
    };

    Ok(format!(
        "{column} >= {} AND {column} <= {}",
        timestamp_literal(ctx.time_range.from_micros()),
        timestamp_literal(ctx.time_range.to_micros()),
    ))
}

/// `$__sampleByInterval`: the query interval as a `SAMPLE BY` bucket size
pub fn sample_by_interval(ctx: &QueryContext, _args: &[String]) -> MacroResult<String> {
    Ok(format_sample_by(ctx.interval))
}

fn timestamp_literal(micros: i64) -> String {
    format!("cast({} as timestamp)", micros)
}
