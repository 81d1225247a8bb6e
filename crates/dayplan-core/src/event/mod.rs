//! Calendar event model
//!
//! The canonical serialized shape uses the camelCase keys earlier clients
//! wrote (`allDay`, `startTime`, `endTime`), so existing storage blobs stay
//! readable. Legacy shapes (`is_all_day`, full ISO datetimes in `date`) are
//! accepted on read through [`normalize`].

pub mod normalize;

pub use normalize::{RawEvent, normalize_event, parse_event_date};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Default color applied to events that do not carry one.
pub const DEFAULT_EVENT_COLOR: &str = "#4285f4";

/// A single calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Millisecond-timestamp-shaped identifier, unique within one user's
    /// collection
    pub id: i64,
    /// Event title
    pub title: String,
    /// Calendar day the event falls on
    pub date: NaiveDate,
    /// All-day flag; timed events carry start/end instead
    pub all_day: bool,
    /// Start time, present iff not all-day
    #[serde(default, with = "hhmm_option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// End time, present iff not all-day
    #[serde(default, with = "hhmm_option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// Display color (hex or named token)
    #[serde(default = "default_color")]
    pub color: String,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

impl Event {
    /// Whether the event occupies a time range rather than the whole day
    pub fn is_timed(&self) -> bool {
        !self.all_day && self.start_time.is_some() && self.end_time.is_some()
    }

    /// Human-readable time span, e.g. "09:00 - 10:30" or "All day"
    pub fn time_label(&self) -> String {
        match (self.all_day, self.start_time, self.end_time) {
            (false, Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            _ => "All day".to_string(),
        }
    }
}

/// User-supplied fields for creating or replacing an event.
///
/// The id is never part of a draft; [`crate::store::EventStore`] assigns and
/// preserves ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub all_day: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub color: String,
    pub notes: Option<String>,
}

impl EventDraft {
    /// Create an all-day draft with the default color
    pub fn all_day(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            all_day: true,
            start_time: None,
            end_time: None,
            color: default_color(),
            notes: None,
        }
    }

    /// Create a timed draft with the default color
    pub fn timed(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            all_day: false,
            start_time: Some(start_time),
            end_time: Some(end_time),
            color: default_color(),
            notes: None,
        }
    }

    /// Set the display color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the notes field
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validate the draft the way the event form does.
    ///
    /// Failures carry the inline message shown to the user.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Please enter an event title".to_string()));
        }
        if !self.all_day && (self.start_time.is_none() || self.end_time.is_none()) {
            return Err(Error::Validation(
                "Please enter both start and end times".to_string(),
            ));
        }
        Ok(())
    }

    /// Materialize the draft into an event with the given id
    pub fn into_event(self, id: i64) -> Event {
        let (start_time, end_time) = if self.all_day {
            (None, None)
        } else {
            (self.start_time, self.end_time)
        };
        Event {
            id,
            title: self.title.trim().to_string(),
            date: self.date,
            all_day: self.all_day,
            start_time,
            end_time,
            color: self.color,
            notes: self.notes,
        }
    }
}

/// Serde adapter for optional "HH:MM" time strings
mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            Some(s) => NaiveTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = EventDraft::timed("Standup", date(2024, 3, 15), time(9, 0), time(9, 30))
            .into_event(1700000000000);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["allDay"], false);
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "09:30");
        assert_eq!(json["date"], "2024-03-15");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_all_day_event_omits_times() {
        let event = EventDraft::all_day("Holiday", date(2024, 7, 4)).into_event(1);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["allDay"], true);
        assert!(json.get("startTime").is_none());
        assert!(json.get("endTime").is_none());
    }

    #[test]
    fn test_time_label() {
        let timed = EventDraft::timed("Call", date(2024, 3, 15), time(14, 0), time(15, 30))
            .into_event(1);
        assert_eq!(timed.time_label(), "14:00 - 15:30");

        let all_day = EventDraft::all_day("Trip", date(2024, 3, 15)).into_event(2);
        assert_eq!(all_day.time_label(), "All day");
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let draft = EventDraft::all_day("   ", date(2024, 3, 15));
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter an event title");
    }

    #[test]
    fn test_validate_rejects_missing_times() {
        let mut draft = EventDraft::all_day("Meeting", date(2024, 3, 15));
        draft.all_day = false;
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter both start and end times");
    }

    #[test]
    fn test_into_event_drops_times_for_all_day() {
        let mut draft = EventDraft::timed("X", date(2024, 3, 15), time(9, 0), time(10, 0));
        draft.all_day = true;
        let event = draft.into_event(1);
        assert!(event.start_time.is_none());
        assert!(event.end_time.is_none());
    }
}
