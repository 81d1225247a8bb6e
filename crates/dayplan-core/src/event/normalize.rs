//! Normalization boundary for externally produced event records.
//!
//! Two historical shapes coexist in storage blobs and server payloads:
//! `allDay` vs `is_all_day` (some producers emit both), and `date` as a bare
//! `YYYY-MM-DD` vs a full ISO-8601 datetime. Every read path funnels through
//! [`normalize_event`] so the rest of the crate only ever sees the canonical
//! [`Event`] shape. Normalizing an already-canonical record is a no-op.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{DEFAULT_EVENT_COLOR, Event};

/// Lenient view of an event record as found in the wild.
///
/// `allDay` and `is_all_day` are separate optional fields rather than serde
/// aliases: the companion server emits both at once, which an alias would
/// reject as a duplicate field.
#[derive(Debug, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "allDay")]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub is_all_day: Option<bool>,
    #[serde(default, rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(default, rename = "endTime")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawEvent {
    /// Merged all-day flag, matching the old client's `allDay || is_all_day`
    pub fn merged_all_day(&self) -> bool {
        self.all_day.unwrap_or(false) || self.is_all_day.unwrap_or(false)
    }
}

/// Accept a calendar date as either `YYYY-MM-DD` or a full ISO-8601
/// datetime; for datetimes the date part wins.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    None
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

/// Convert one externally produced record into the canonical event shape.
///
/// `fallback_id` is used when the record carries no usable numeric id.
/// Returns `None` (with a warning) for records too malformed to place on a
/// calendar; a bad record never aborts loading the rest of the collection.
pub fn normalize_event(value: &Value, fallback_id: i64) -> Option<Event> {
    let raw: RawEvent = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping malformed event record: {}", e);
            return None;
        }
    };

    let date = match raw.date.as_deref().and_then(parse_event_date) {
        Some(date) => date,
        None => {
            warn!(
                "Skipping event record with unreadable date: {:?}",
                raw.date
            );
            return None;
        }
    };

    let id = match &raw.id {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(fallback_id),
        Some(Value::String(s)) => s.parse().unwrap_or(fallback_id),
        _ => fallback_id,
    };

    let mut all_day = raw.merged_all_day();
    let start_time = raw.start_time.as_deref().and_then(parse_hhmm);
    let end_time = raw.end_time.as_deref().and_then(parse_hhmm);

    // A timed event without both times cannot be positioned on the grid;
    // degrade it to all-day rather than dropping it.
    if !all_day && (start_time.is_none() || end_time.is_none()) {
        warn!(
            "Event {} ({:?}) is timed but missing start/end; treating as all-day",
            id, raw.title
        );
        all_day = true;
    }

    let (start_time, end_time) = if all_day {
        (None, None)
    } else {
        (start_time, end_time)
    };

    Some(Event {
        id,
        title: raw.title.unwrap_or_default(),
        date,
        all_day,
        start_time,
        end_time,
        color: raw
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
        notes: raw.notes.filter(|n| !n.is_empty()),
    })
}
