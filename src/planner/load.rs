use chrono::{DateTime, Utc};
use serde::Serialize;

/// Days scheduled beyond this many minutes are flagged.
pub const OVERBOOKED_AFTER_MINUTES: i64 = 12 * 60;
const MIN_ACTIVITY_MINUTES: i64 = 15;
const DEFAULT_ACTIVITY_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLoad {
    pub total_minutes: i64,
    pub overbooked: bool,
}

/// Scheduled length, at least 15 minutes; an hour when either end is unset.
pub fn activity_minutes(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => {
            let seconds = (end - start).num_seconds().max(0);
            let minutes = (seconds as f64 / 60.0).round() as i64;
            minutes.max(MIN_ACTIVITY_MINUTES)
        }
        _ => DEFAULT_ACTIVITY_MINUTES,
    }
}

pub fn day_load<I>(spans: I) -> DayLoad
where
    I: IntoIterator<Item = (Option<DateTime<Utc>>, Option<DateTime<Utc>>)>,
{
    let total_minutes = spans
        .into_iter()
        .map(|(start, end)| activity_minutes(start, end))
        .sum();
    DayLoad {
        total_minutes,
        overbooked: total_minutes > OVERBOOKED_AFTER_MINUTES,
    }
}
