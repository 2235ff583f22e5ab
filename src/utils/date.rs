// Schedule time parsing and display

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use anyhow::{Context, Result};

/// Parse a schedule time and return a Unix timestamp (UTC)
///
/// Accepted forms, all in local time:
/// - `2026-10-18 14:30`
/// - `2026-10-18T14:30`
/// - `14:30` (today)
pub fn parse_time_expr(expr: &str) -> Result<i64> {
    let expr = expr.trim();

    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, format) {
            return to_local_timestamp(&datetime);
        }
    }

    if let Ok(time) = NaiveTime::parse_from_str(expr, "%H:%M") {
        let today: NaiveDate = Local::now().date_naive();
        return to_local_timestamp(&today.and_time(time));
    }

    anyhow::bail!(
        "Invalid time: '{}'. Use 'YYYY-MM-DD HH:MM', 'YYYY-MM-DDTHH:MM' or 'HH:MM'.",
        expr
    )
}

fn to_local_timestamp(datetime: &NaiveDateTime) -> Result<i64> {
    let local_dt = Local.from_local_datetime(datetime)
        .earliest()
        .with_context(|| format!("Time {} does not exist in the local timezone", datetime))?;
    Ok(local_dt.timestamp())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` in local time
pub fn format_time(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}
