//! Chat endpoint HTTP client
//!
//! A thin request/response wrapper with a single attempt per call: there is
//! no retry or backoff, connection trouble is handled by the assistant's
//! mode transitions instead.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::types::{ChatRequest, ChatResponse};

/// HTTP client for the chat endpoint and its companion events endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    api_url: String,
}

impl ChatClient {
    /// Create a client for the given endpoint URL
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// The chat endpoint URL currently in use
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Point the client at a different chat endpoint
    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.api_url = api_url.into();
    }

    /// Companion events endpoint: the chat URL with `/chat` swapped for
    /// `/events`
    pub fn events_url(&self) -> String {
        self.api_url.replacen("/chat", "/events", 1)
    }

    /// Probe the endpoint with a "ping" message.
    ///
    /// Any transport failure or non-success status is an error; the caller
    /// decides what mode to fall into.
    pub async fn probe(&self, user_id: &str) -> Result<()> {
        debug!("Probing chat endpoint: {}", self.api_url);

        let request = ChatRequest {
            user_id: user_id.to_string(),
            message: "ping".to_string(),
            pending_event: None,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ChatApi(format!(
                "probe returned {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        debug!("Chat endpoint is ready");
        Ok(())
    }

    /// Send a chat message, with any pending suggested event attached
    pub async fn send(&self, request: ChatRequest) -> Result<ChatResponse> {
        debug!("Sending chat message to: {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Chat endpoint error: {} - {}", status, body);
            return Err(Error::ChatApi(format!("{}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::ChatApi(format!("Failed to parse response: {} - {}", e, body)))
    }

    /// Fetch the authoritative event list for a user.
    ///
    /// Records come back in whatever shape the server uses; normalization
    /// happens in the event store.
    pub async fn fetch_events(&self, user_id: &str) -> Result<Vec<Value>> {
        let url = self.events_url();
        debug!("Fetching events from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ChatApi(format!("events endpoint returned {}", status)));
        }

        let value: Value = response.json().await.map_err(Error::Http)?;
        match value {
            Value::Array(events) => Ok(events),
            other => Err(Error::ChatApi(format!(
                "events endpoint did not return a list: {}",
                other
            ))),
        }
    }
}
