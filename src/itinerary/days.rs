use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Longest date range a trip may cover, in days.
pub const MAX_TRIP_DAYS: i64 = 3660;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("a trip may span at most {} days", MAX_TRIP_DAYS)]
pub struct SpanTooLong;

/// Rejects ranges that would create more than `MAX_TRIP_DAYS` days.
pub fn check_span(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), SpanTooLong> {
    match (start, end) {
        (Some(start), Some(end)) if (end - start).num_days() >= MAX_TRIP_DAYS => {
            Err(SpanTooLong)
        }
        _ => Ok(()),
    }
}

/// Every date from `start` to `end` inclusive. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Dates in the trip's range that have no day yet.
pub fn missing_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    existing: &[NaiveDate],
) -> Vec<NaiveDate> {
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };
    date_range(start, end)
        .into_iter()
        .filter(|d| !existing.contains(d))
        .collect()
}

/// Accepts `YYYY-MM-DD` or a full timestamp, keeping the UTC calendar date.
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_instant(raw).map(|dt| dt.date_naive())
}

/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or a
/// bare date (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
