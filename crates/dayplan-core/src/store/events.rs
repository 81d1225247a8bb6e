//! Per-user event collection
//!
//! Events live as one JSON array blob under `events_<email>`. All operations
//! are synchronous full-collection scans; fine at this scale, a date index
//! would be the first change for anything larger.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::event::{Event, EventDraft, normalize_event};
use crate::store::kv::{KvStore, events_key};

/// Event collection scoped to a single user
pub struct EventStore {
    store: Arc<KvStore>,
    email: String,
}

impl EventStore {
    /// Create a store view over the given user's collection
    pub fn new(store: Arc<KvStore>, email: impl Into<String>) -> Self {
        Self {
            store,
            email: email.into(),
        }
    }

    /// Email the collection is namespaced by
    pub fn email(&self) -> &str {
        &self.email
    }

    fn key(&self) -> String {
        events_key(&self.email)
    }

    /// Load and normalize the full collection.
    ///
    /// Records in legacy shapes are converted; unreadable records are
    /// skipped with a warning, never fatal.
    pub fn load(&self) -> Result<Vec<Event>> {
        let raw: Vec<Value> = self.store.get_json(&self.key())?;
        let mut events = Vec::with_capacity(raw.len());
        let mut fallback_id = Utc::now().timestamp_millis();

        for value in &raw {
            if let Some(event) = normalize_event(value, fallback_id) {
                fallback_id = fallback_id.max(event.id) + 1;
                events.push(event);
            }
        }

        Ok(events)
    }

    fn save(&self, events: &[Event]) -> Result<()> {
        self.store.set_json(&self.key(), &events)
    }

    /// Next event id: timestamp-shaped, but guaranteed to advance past every
    /// existing id so rapid double-submits cannot collide.
    fn next_id(events: &[Event]) -> i64 {
        let max_id = events.iter().map(|e| e.id).max().unwrap_or(0);
        Utc::now().timestamp_millis().max(max_id + 1)
    }

    /// Validate and add a new event; returns it with its assigned id
    pub fn add(&self, draft: EventDraft) -> Result<Event> {
        draft.validate()?;
        let mut events = self.load()?;
        let event = draft.into_event(Self::next_id(&events));
        debug!("Adding event {} on {}", event.id, event.date);
        events.push(event.clone());
        self.save(&events)?;
        Ok(event)
    }

    /// Replace the event with the given id; returns whether it existed
    pub fn update(&self, id: i64, draft: EventDraft) -> Result<bool> {
        draft.validate()?;
        let mut events = self.load()?;
        let Some(slot) = events.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        *slot = draft.into_event(id);
        self.save(&events)?;
        Ok(true)
    }

    /// Delete the event with the given id; returns whether it existed
    pub fn remove(&self, id: i64) -> Result<bool> {
        let mut events = self.load()?;
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Ok(false);
        }
        self.save(&events)?;
        Ok(true)
    }

    /// Find an event by id
    pub fn get(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.load()?.into_iter().find(|e| e.id == id))
    }

    /// All events falling on the given calendar day
    pub fn list_for_day(&self, date: NaiveDate) -> Result<Vec<Event>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|e| e.date == date)
            .collect())
    }

    /// The full collection
    pub fn list_all(&self) -> Result<Vec<Event>> {
        self.load()
    }

    /// Replace the whole collection with records fetched from the server.
    ///
    /// Used after the assistant reports `event_added`: the server's list is
    /// authoritative and may arrive in legacy shapes.
    pub fn replace_all(&self, raw: Vec<Value>) -> Result<Vec<Event>> {
        let mut events = Vec::with_capacity(raw.len());
        let mut fallback_id = Utc::now().timestamp_millis();

        for value in &raw {
            if let Some(event) = normalize_event(value, fallback_id) {
                fallback_id = fallback_id.max(event.id) + 1;
                events.push(event);
            }
        }

        self.save(&events)?;
        debug!("Replaced event collection with {} records", events.len());
        Ok(events)
    }
}
