//! Chat message log
//!
//! Append-only list under the `chatMessages` key, persisted in full on
//! every mutation. The log is shared across the device the way the original
//! client shared it, not namespaced per user.

use chrono::Utc;
use std::sync::Arc;

use crate::Result;
use crate::chat::ChatMessage;
use crate::store::kv::{KEY_CHAT_MESSAGES, KvStore};

/// Persistent chat panel log
pub struct MessageLog {
    store: Arc<KvStore>,
}

impl MessageLog {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    /// Load the full log; corrupted blobs yield an empty log
    pub fn load(&self) -> Result<Vec<ChatMessage>> {
        self.store.get_json(KEY_CHAT_MESSAGES)
    }

    /// Number of messages in the log
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }

    fn save(&self, messages: &[ChatMessage]) -> Result<()> {
        self.store.set_json(KEY_CHAT_MESSAGES, &messages)
    }

    /// Append a message, assigning it a fresh id; returns the stored copy
    pub fn push(&self, mut message: ChatMessage) -> Result<ChatMessage> {
        let mut messages = self.load()?;
        let max_id = messages.iter().map(|m| m.id).max().unwrap_or(0);
        message.id = Utc::now().timestamp_millis().max(max_id + 1);
        messages.push(message.clone());
        self.save(&messages)?;
        Ok(message)
    }

    /// Rewrite the text of the first message containing `needle` in place.
    ///
    /// Used to replace the "connecting" placeholder once the probe settles.
    /// Returns whether a message was rewritten.
    pub fn rewrite_first_containing(&self, needle: &str, new_text: &str) -> Result<bool> {
        let mut messages = self.load()?;
        let Some(message) = messages.iter_mut().find(|m| m.text.contains(needle)) else {
            return Ok(false);
        };
        message.text = new_text.to_string();
        self.save(&messages)?;
        Ok(true)
    }
}
