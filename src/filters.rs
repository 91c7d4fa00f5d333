/// Source filters: time-window and per-tag collection caps.
///
/// The window test keeps an item iff the whole number of days between the
/// item's date and the reference time is at most the lookback. Items whose
/// date is missing or unparsable are never kept by a windowed view.
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::types::{TIMESTAMP_FORMAT, TrendRecord, parse_timestamp};

/// Naive formats accepted for source-provided dates, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 2] = [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S"];

/// Parse a date as emitted by the collection sources.
///
/// Accepts the canonical `YYYY-MM-DD HH:MM:SS`, a bare `YYYY-MM-DD`
/// (midnight), naive ISO-8601 and RFC 3339 with an offset (converted to the
/// local clock).
pub fn parse_item_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Some(at);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Local).naive_local())
}

/// Whole days elapsed from `then` to `now`; negative for future dates.
pub fn days_between(then: &NaiveDateTime, now: &NaiveDateTime) -> i64 {
    now.signed_duration_since(*then).num_days()
}

/// Inclusive lookback test on an already parsed date.
pub fn within_window(then: &NaiveDateTime, lookback_days: u32, now: &NaiveDateTime) -> bool {
    days_between(then, now) <= i64::from(lookback_days)
}

/// Window test for a stored trend record. Only the canonical timestamp
/// format counts; anything else is excluded.
pub fn record_within_window(record: &TrendRecord, lookback_days: u32, now: &NaiveDateTime) -> bool {
    record
        .timestamp()
        .and_then(|ts| parse_timestamp(ts).ok())
        .is_some_and(|at| within_window(&at, lookback_days, now))
}

/// Window test for a raw source item, reading the date from `date_field`.
pub fn item_within_window(
    item: &Map<String, JsonValue>,
    date_field: &str,
    lookback_days: u32,
    now: &NaiveDateTime,
) -> bool {
    item.get(date_field)
        .and_then(JsonValue::as_str)
        .and_then(parse_item_date)
        .is_some_and(|at| within_window(&at, lookback_days, now))
}

/// Keep the items whose `date_field` falls inside the window, preserving order.
pub fn retain_within_window(
    items: Vec<Map<String, JsonValue>>,
    date_field: &str,
    lookback_days: u32,
    now: &NaiveDateTime,
) -> Vec<Map<String, JsonValue>> {
    let before = items.len();
    let kept: Vec<_> = items
        .into_iter()
        .filter(|item| item_within_window(item, date_field, lookback_days, now))
        .collect();

    if kept.len() != before {
        debug!(
            date_field,
            lookback_days,
            dropped = before - kept.len(),
            "window filter dropped items"
        );
    }
    kept
}

/// Per-tag result cap when `max_total` results are shared evenly across
/// `tag_count` tags. With no tags the whole budget goes to one query.
pub fn per_tag_cap(max_total: usize, tag_count: usize) -> usize {
    if tag_count == 0 {
        max_total
    } else {
        max_total / tag_count
    }
}
