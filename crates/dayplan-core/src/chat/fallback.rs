//! Local keyword-matched responses for fallback mode
//!
//! When the remote endpoint is unreachable the assistant answers from this
//! responder: substring matching over the lowercased message, with a small
//! set of commands and canned closers.

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::config::DEFAULT_CHAT_API_URL;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

static DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(today|tomorrow|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("day pattern is valid")
});

/// Reply for "show events" with an empty calendar
pub const NO_EVENTS_REPLY: &str = "No events scheduled.";

const HELP_REPLY: &str = "Commands:\n\u{2022} Show events\n\u{2022} Create new event\n\u{2022} Show API URL\n\u{2022} Set API URL\n\u{2022} Switch to online mode";

const CANNED_REPLIES: [&str; 4] = [
    "Simple mode active. Start server for full features.",
    "Limited mode. Start the chat server for AI assistant.",
    "Basic calendar only. Connect to server for more.",
    "Simple mode. Type 'help' for commands.",
];

/// What the assistant should do with a fallback-mode message
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackAction {
    /// Just reply with text
    Reply(String),
    /// Clear the fallback flag and re-probe the endpoint
    SwitchOnline { reply: String },
    /// Persist a new endpoint URL, then re-probe
    SetApiUrl { url: String, reply: String },
    /// Restore the default endpoint URL
    ResetApiUrl { reply: String },
    /// Reply, then follow up with a locally built event suggestion
    SuggestEvent {
        reply: String,
        followup: String,
        suggestion: Value,
    },
}

/// Calendar facts the responder needs to answer
#[derive(Debug, Clone, Copy)]
pub struct FallbackContext<'a> {
    pub event_count: usize,
    pub api_url: &'a str,
    pub today: NaiveDate,
}

/// Keyword responder for fallback mode
#[derive(Debug, Default)]
pub struct FallbackResponder {
    canned_index: usize,
}

impl FallbackResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a message against the fallback command set
    pub fn respond(&mut self, message: &str, ctx: &FallbackContext<'_>) -> FallbackAction {
        let message = message.to_lowercase();

        if message.contains("switch to online mode")
            || message.contains("disable fallback")
            || message.contains("use server")
        {
            return FallbackAction::SwitchOnline {
                reply: "Connecting to server...".to_string(),
            };
        }

        if message.contains("set api url")
            || message.contains("change api url")
            || message.contains("update api url")
        {
            return match URL_RE.find(&message) {
                Some(url) => FallbackAction::SetApiUrl {
                    url: url.as_str().to_string(),
                    reply: format!("API URL updated to {}. Connecting...", url.as_str()),
                },
                None => FallbackAction::Reply(
                    "Include full URL like 'set api url to http://localhost:5000/api/chat'"
                        .to_string(),
                ),
            };
        }

        // Checked before the bare "api url" catch-all, which would otherwise
        // swallow every reset request.
        if message.contains("reset api url") || message.contains("default api url") {
            return FallbackAction::ResetApiUrl {
                reply: format!("API URL reset to default: {}", DEFAULT_CHAT_API_URL),
            };
        }

        if message.contains("show api url")
            || message.contains("what is the api url")
            || message.contains("api url")
        {
            return FallbackAction::Reply(format!("API URL: {}", ctx.api_url));
        }

        if message.contains("help") || message == "?" {
            return FallbackAction::Reply(HELP_REPLY.to_string());
        }

        if message.contains("create event")
            || message.contains("add event")
            || message.contains("new event")
            || message.contains("schedule")
        {
            let date = resolve_event_date(&message, ctx.today);
            return FallbackAction::SuggestEvent {
                reply: "Creating event...".to_string(),
                followup: "Use '/add' or connect to server for events.".to_string(),
                suggestion: json!({
                    "title": "New Event",
                    "date": date.format("%Y-%m-%d").to_string(),
                    "is_all_day": true,
                }),
            };
        }

        if message.contains("show events")
            || message.contains("my events")
            || message.contains("my calendar")
        {
            return FallbackAction::Reply(match ctx.event_count {
                0 => NO_EVENTS_REPLY.to_string(),
                1 => "1 event in calendar.".to_string(),
                n => format!("{} events in calendar.", n),
            });
        }

        let reply = CANNED_REPLIES[self.canned_index % CANNED_REPLIES.len()];
        self.canned_index += 1;
        FallbackAction::Reply(reply.to_string())
    }
}

/// Resolve "today" / "tomorrow" / a weekday name to a date; weekday names
/// mean the next upcoming one. Defaults to today.
fn resolve_event_date(message: &str, today: NaiveDate) -> NaiveDate {
    let Some(found) = DAY_RE.find(message) else {
        return today;
    };

    match found.as_str() {
        "today" => today,
        "tomorrow" => today.checked_add_days(Days::new(1)).unwrap_or(today),
        name => {
            let target = match name {
                "monday" => 1,
                "tuesday" => 2,
                "wednesday" => 3,
                "thursday" => 4,
                "friday" => 5,
                "saturday" => 6,
                _ => 0, // sunday
            };
            let current = today.weekday().num_days_from_sunday();
            let mut ahead = (target + 7 - current) % 7;
            if ahead == 0 {
                ahead = 7;
            }
            today
                .checked_add_days(Days::new(u64::from(ahead)))
                .unwrap_or(today)
        }
    }
}
