//! Chat panel types and the remote endpoint wire contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{RawEvent, parse_event_date};

/// One entry in the chat panel's append-only log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Millisecond-timestamp-shaped identifier
    pub id: i64,
    /// Message body
    pub text: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// true for user messages, false for assistant messages
    pub sent: bool,
    /// Set when the message carries an event suggestion awaiting
    /// confirm/decline
    #[serde(default)]
    pub event_suggestion: bool,
    /// The suggested event payload, kept verbatim so it can be posted back
    /// for the confirmation round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<Value>,
    /// Suggestion produced locally in fallback mode; these offer manual
    /// creation instead of confirm/decline
    #[serde(default)]
    pub fallback_mode: bool,
}

impl ChatMessage {
    /// Create an assistant message (id is assigned by the message log)
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            timestamp: Utc::now(),
            sent: false,
            event_suggestion: false,
            event_data: None,
            fallback_mode: false,
        }
    }

    /// Create a user message (id is assigned by the message log)
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sent: true,
            ..Self::bot(text)
        }
    }

    /// Attach an event suggestion payload
    pub fn with_suggestion(mut self, event_data: Value, fallback_mode: bool) -> Self {
        self.event_suggestion = true;
        self.event_data = Some(event_data);
        self.fallback_mode = fallback_mode;
        self
    }
}

/// Request body for `POST <api_url>`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    /// Pending suggested event, attached for confirmation round trips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_event: Option<Value>,
}

/// Response body from the chat endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: String,
    /// The server proposes an event; `event_data` holds it
    #[serde(default)]
    pub event_suggested: bool,
    #[serde(default)]
    pub event_data: Option<Value>,
    /// The server persisted an event; the authoritative list should be
    /// re-fetched
    #[serde(default)]
    pub event_added: bool,
    #[serde(default)]
    pub add_result: Option<Value>,
}

/// Render a suggestion payload for display: title, long-form date, time
/// span, and notes when present.
pub fn describe_suggestion(event_data: &Value) -> String {
    let raw: RawEvent = serde_json::from_value(event_data.clone()).unwrap_or_default();

    let title = raw.title.clone().unwrap_or_else(|| "New Event".to_string());

    let date_label = raw
        .date
        .as_deref()
        .map(|d| match parse_event_date(d) {
            Some(date) => date.format("%A, %B %-d, %Y").to_string(),
            None => d.to_string(),
        })
        .unwrap_or_default();

    let time_label = if raw.merged_all_day() {
        "All day".to_string()
    } else {
        match (raw.start_time.as_deref(), raw.end_time.as_deref()) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            (Some(start), None) => start.to_string(),
            _ => "All day".to_string(),
        }
    };

    let mut lines = vec![title, format!("{}  {}", date_label, time_label)];
    if let Some(notes) = raw.notes.filter(|n| !n.is_empty()) {
        lines.push(notes);
    }
    lines.join("\n")
}
