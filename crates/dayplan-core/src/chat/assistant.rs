//! Chat assistant state machine
//!
//! `Connecting -> {Online, Offline -> Fallback, Fallback}`: a probe decides
//! whether the panel talks to the remote endpoint or the local responder. A
//! failed probe downgrades immediately; a failed send only reports and
//! suggests the switch. Every message lands in the persistent log.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::Result;
use crate::config::{ChatConfig, DEFAULT_CHAT_API_URL};
use crate::store::{EventStore, KEY_CHAT_API_URL, KEY_USE_FALLBACK_CHAT, KvStore, MessageLog};

use super::client::ChatClient;
use super::fallback::{FallbackAction, FallbackContext, FallbackResponder};
use super::types::{ChatMessage, ChatRequest};

/// Connection state of the chat panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Online,
    Offline,
    Fallback,
}

impl ConnectionStatus {
    /// Status label as shown in the panel header
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
            ConnectionStatus::Fallback => "Local Mode",
        }
    }
}

/// Placeholder posted while the probe is in flight; rewritten in place once
/// the connection settles.
pub const CONNECTING_WELCOME: &str =
    "Welcome to your calendar assistant! I'm connecting to the AI service...";
const CONNECTING_NEEDLE: &str = "I'm connecting to the AI service";

const READY_WELCOME: &str = "Calendar assistant ready. How can I help?";
const LOCAL_MODE_NOTICE: &str = "I'm in local mode. Basic calendar functions only.";
const PROBE_REJECTED_NOTICE: &str = "Connection failed. Using simple mode.";
const PROBE_FAILED_NOTICE: &str =
    "Server connection failed. Using simple mode. Start the chat server for full features.";
const NOT_CONNECTED_NOTICE: &str =
    "I'm not connected to the AI assistant server. Please make sure it's running.";
const SEND_FAILED_NOTICE: &str =
    "I'm sorry, I encountered an error processing your request. Please try again or switch to simplified mode.";
const SUGGEST_SIMPLE_MODE: &str =
    "Would you like to switch to simplified assistant mode? Type 'switch to simple mode' to enable it.";
const RECONNECTING_NOTICE: &str = "Attempting to connect to the AI assistant server...";

/// The chat panel: remote-or-fallback responses, pending event suggestions,
/// and the persistent message log
pub struct Assistant {
    client: ChatClient,
    store: Arc<KvStore>,
    messages: MessageLog,
    events: EventStore,
    user_id: String,
    status: ConnectionStatus,
    /// Whether the panel accepts messages at all
    ready: bool,
    use_fallback: bool,
    fallback: FallbackResponder,
    /// Server-suggested event awaiting confirm/decline
    pending_event: Option<Value>,
}

impl Assistant {
    /// Create the assistant for the logged-in user.
    ///
    /// A `chatApiUrl` stored by a previous session overrides the configured
    /// endpoint; the `useFallbackChat` flag short-circuits probing.
    pub fn new(
        config: &ChatConfig,
        store: Arc<KvStore>,
        user_id: impl Into<String>,
    ) -> Result<Self> {
        let user_id = user_id.into();
        let api_url = store
            .get(KEY_CHAT_API_URL)?
            .unwrap_or_else(|| config.api_url.clone());
        let use_fallback = store.get(KEY_USE_FALLBACK_CHAT)?.as_deref() == Some("true");

        Ok(Self {
            client: ChatClient::new(api_url, config.timeout_secs)?,
            messages: MessageLog::new(store.clone()),
            events: EventStore::new(store.clone(), &user_id),
            store,
            user_id,
            status: ConnectionStatus::Connecting,
            ready: false,
            use_fallback,
            fallback: FallbackResponder::new(),
            pending_event: None,
        })
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn api_url(&self) -> &str {
        self.client.api_url()
    }

    pub fn pending_event(&self) -> Option<&Value> {
        self.pending_event.as_ref()
    }

    /// The full persisted message log
    pub fn history(&self) -> Result<Vec<ChatMessage>> {
        self.messages.load()
    }

    fn push_bot(&self, text: &str) -> Result<ChatMessage> {
        self.messages.push(ChatMessage::bot(text))
    }

    fn set_use_fallback(&mut self, value: bool) -> Result<()> {
        self.use_fallback = value;
        self.store
            .set(KEY_USE_FALLBACK_CHAT, if value { "true" } else { "false" })
    }

    /// Post the connecting placeholder; call once at panel startup, before
    /// [`Assistant::connect`]
    pub fn post_welcome(&self) -> Result<ChatMessage> {
        self.push_bot(CONNECTING_WELCOME)
    }

    /// Probe the endpoint and settle into Online or Fallback
    pub async fn connect(&mut self) -> Result<()> {
        self.status = ConnectionStatus::Connecting;

        if self.use_fallback {
            self.ready = true;
            self.status = ConnectionStatus::Fallback;
            self.push_bot(LOCAL_MODE_NOTICE)?;
            return Ok(());
        }

        match self.client.probe(&self.user_id).await {
            Ok(()) => {
                info!("Chat endpoint is ready");
                self.ready = true;
                self.status = ConnectionStatus::Online;
                if !self
                    .messages
                    .rewrite_first_containing(CONNECTING_NEEDLE, READY_WELCOME)?
                {
                    self.push_bot(READY_WELCOME)?;
                }
            }
            Err(e) => {
                warn!("Chat endpoint probe failed: {}", e);
                self.status = ConnectionStatus::Offline;
                let notice = match &e {
                    crate::Error::ChatApi(_) => PROBE_REJECTED_NOTICE,
                    _ => PROBE_FAILED_NOTICE,
                };
                self.enable_fallback(notice)?;
            }
        }

        Ok(())
    }

    /// Activate fallback mode, replacing the connecting placeholder with the
    /// given notice
    fn enable_fallback(&mut self, notice: &str) -> Result<()> {
        self.set_use_fallback(true)?;
        self.ready = true;
        self.status = ConnectionStatus::Fallback;
        if !self
            .messages
            .rewrite_first_containing(CONNECTING_NEEDLE, notice)?
        {
            self.push_bot(notice)?;
        }
        Ok(())
    }

    /// Clear the fallback flag and try the endpoint again
    pub async fn reconnect(&mut self) -> Result<()> {
        self.set_use_fallback(false)?;
        self.ready = false;
        self.push_bot(RECONNECTING_NOTICE)?;
        self.connect().await
    }

    /// Handle one user message; returns the assistant messages it produced
    pub async fn send(&mut self, text: &str) -> Result<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        self.messages.push(ChatMessage::user(text))?;
        let replies_from = self.messages.len()?;

        if !self.ready {
            self.push_bot(NOT_CONNECTED_NOTICE)?;
            return self.tail(replies_from);
        }

        if self.use_fallback {
            self.respond_fallback(text).await?;
            return self.tail(replies_from);
        }

        let request = ChatRequest {
            user_id: self.user_id.clone(),
            message: text.to_string(),
            pending_event: self.pending_event.clone(),
        };

        match self.client.send(request).await {
            Ok(response) => match (response.event_suggested, response.event_data) {
                (true, Some(data)) => {
                    self.pending_event = Some(data.clone());
                    self.messages
                        .push(ChatMessage::bot(response.response).with_suggestion(data, false))?;
                }
                (suggested, _) => {
                    self.push_bot(&response.response)?;
                    if response.event_added && response.add_result.is_some() {
                        self.refresh_events().await;
                        self.pending_event = None;
                    } else if !suggested {
                        self.pending_event = None;
                    }
                }
            },
            Err(e) => {
                warn!("Error sending message to chat endpoint: {}", e);
                self.push_bot(SEND_FAILED_NOTICE)?;
                self.push_bot(SUGGEST_SIMPLE_MODE)?;
            }
        }

        self.tail(replies_from)
    }

    /// Answer locally and apply any command side effects
    async fn respond_fallback(&mut self, text: &str) -> Result<()> {
        let context = FallbackContext {
            event_count: self.events.list_all()?.len(),
            api_url: self.client.api_url(),
            today: chrono::Local::now().date_naive(),
        };
        let action = self.fallback.respond(text, &context);

        match action {
            FallbackAction::Reply(reply) => {
                self.push_bot(&reply)?;
            }
            FallbackAction::SwitchOnline { reply } => {
                self.push_bot(&reply)?;
                self.set_use_fallback(false)?;
                self.ready = false;
                self.connect().await?;
            }
            FallbackAction::SetApiUrl { url, reply } => {
                self.store.set(KEY_CHAT_API_URL, &url)?;
                self.client.set_api_url(&url);
                self.push_bot(&reply)?;
                self.set_use_fallback(false)?;
                self.ready = false;
                self.connect().await?;
            }
            FallbackAction::ResetApiUrl { reply } => {
                self.store.set(KEY_CHAT_API_URL, DEFAULT_CHAT_API_URL)?;
                self.client.set_api_url(DEFAULT_CHAT_API_URL);
                self.push_bot(&reply)?;
            }
            FallbackAction::SuggestEvent {
                reply,
                followup,
                suggestion,
            } => {
                self.push_bot(&reply)?;
                self.messages
                    .push(ChatMessage::bot(followup).with_suggestion(suggestion, true))?;
            }
        }

        Ok(())
    }

    /// Pull the server's authoritative event list into the local store.
    ///
    /// Failures only log; the local collection stays as-is.
    async fn refresh_events(&mut self) {
        match self.client.fetch_events(&self.user_id).await {
            Ok(raw) => match self.events.replace_all(raw) {
                Ok(events) => {
                    info!("Calendar updated with {} events from server", events.len());
                }
                Err(e) => warn!("Failed to store fetched events: {}", e),
            },
            Err(e) => warn!("Error fetching events from server: {}", e),
        }
    }

    fn tail(&self, from: usize) -> Result<Vec<ChatMessage>> {
        Ok(self.messages.load()?.into_iter().skip(from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use chrono::NaiveDate;

    /// Config pointing at a port that refuses connections immediately.
    fn unroutable_config() -> ChatConfig {
        ChatConfig {
            api_url: "http://127.0.0.1:1/api/chat".to_string(),
            timeout_secs: 1,
        }
    }

    fn assistant(store: Arc<KvStore>) -> Assistant {
        Assistant::new(&unroutable_config(), store, "ada@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_probe_failure_transitions_to_fallback() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store.clone());

        assistant.post_welcome().unwrap();
        assistant.connect().await.unwrap();

        assert_eq!(assistant.status(), ConnectionStatus::Fallback);
        assert_eq!(
            store.get(KEY_USE_FALLBACK_CHAT).unwrap(),
            Some("true".to_string())
        );

        // The connecting placeholder was rewritten in place, not appended.
        let history = assistant.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, PROBE_FAILED_NOTICE);
    }

    #[tokio::test]
    async fn test_stored_fallback_flag_skips_probe() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        store.set(KEY_USE_FALLBACK_CHAT, "true").unwrap();

        let mut assistant = assistant(store);
        assistant.connect().await.unwrap();

        assert_eq!(assistant.status(), ConnectionStatus::Fallback);
        let history = assistant.history().unwrap();
        assert_eq!(history.last().unwrap().text, LOCAL_MODE_NOTICE);
    }

    #[tokio::test]
    async fn test_fallback_show_events_with_empty_store() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store);
        assistant.connect().await.unwrap();

        let replies = assistant.send("show events").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "No events scheduled.");
    }

    #[tokio::test]
    async fn test_fallback_show_events_counts_stored_events() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let events = EventStore::new(store.clone(), "ada@example.com");
        events
            .add(EventDraft::all_day(
                "Demo",
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            ))
            .unwrap();

        let mut assistant = assistant(store);
        assistant.connect().await.unwrap();

        let replies = assistant.send("show my events").await.unwrap();
        assert_eq!(replies[0].text, "1 event in calendar.");
    }

    #[tokio::test]
    async fn test_fallback_create_event_emits_suggestion() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store);
        assistant.connect().await.unwrap();

        let replies = assistant.send("create event tomorrow").await.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].text, "Creating event...");
        assert!(replies[1].event_suggestion);
        assert!(replies[1].fallback_mode);
        let data = replies[1].event_data.as_ref().unwrap();
        assert_eq!(data["title"], "New Event");
        // Local suggestions never become the pending server round trip.
        assert!(assistant.pending_event().is_none());
    }

    #[tokio::test]
    async fn test_send_before_connect_reports_not_connected() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store);

        let replies = assistant.send("hello").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, NOT_CONNECTED_NOTICE);
    }

    #[tokio::test]
    async fn test_user_messages_are_logged() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store);
        assistant.connect().await.unwrap();
        assistant.send("show events").await.unwrap();

        let history = assistant.history().unwrap();
        let user_entries: Vec<_> = history.iter().filter(|m| m.sent).collect();
        assert_eq!(user_entries.len(), 1);
        assert_eq!(user_entries[0].text, "show events");
    }

    #[tokio::test]
    async fn test_switch_to_online_reprobes_and_falls_back_again() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        let mut assistant = assistant(store.clone());
        assistant.connect().await.unwrap();

        let replies = assistant.send("switch to online mode").await.unwrap();
        assert_eq!(replies[0].text, "Connecting to server...");
        // The endpoint is still unreachable, so the probe lands back in
        // fallback and says so.
        assert_eq!(assistant.status(), ConnectionStatus::Fallback);
        assert_eq!(replies.last().unwrap().text, PROBE_FAILED_NOTICE);
        assert_eq!(
            store.get(KEY_USE_FALLBACK_CHAT).unwrap(),
            Some("true".to_string())
        );
    }

    #[tokio::test]
    async fn test_reset_api_url_updates_store_and_client() {
        let store = Arc::new(KvStore::in_memory().unwrap());
        store
            .set(KEY_CHAT_API_URL, "http://elsewhere:9999/api/chat")
            .unwrap();

        let mut assistant = assistant(store.clone());
        assert_eq!(assistant.api_url(), "http://elsewhere:9999/api/chat");

        assistant.connect().await.unwrap();
        assistant.send("reset api url").await.unwrap();

        assert_eq!(assistant.api_url(), DEFAULT_CHAT_API_URL);
        assert_eq!(
            store.get(KEY_CHAT_API_URL).unwrap(),
            Some(DEFAULT_CHAT_API_URL.to_string())
        );
    }

    #[tokio::test]
    async fn test_status_labels() {
        assert_eq!(ConnectionStatus::Connecting.label(), "Connecting...");
        assert_eq!(ConnectionStatus::Online.label(), "Online");
        assert_eq!(ConnectionStatus::Offline.label(), "Offline");
        assert_eq!(ConnectionStatus::Fallback.label(), "Local Mode");
    }
}
