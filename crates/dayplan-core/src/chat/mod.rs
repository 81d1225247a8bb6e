//! Chat assistant: the endpoint client, the local fallback responder, and
//! the connection state machine gluing them together.

pub mod assistant;
pub mod client;
pub mod fallback;
pub mod types;

pub use assistant::{Assistant, CONNECTING_WELCOME, ConnectionStatus};
pub use client::ChatClient;
pub use fallback::{FallbackAction, FallbackContext, FallbackResponder, NO_EVENTS_REPLY};
pub use types::{ChatMessage, ChatRequest, ChatResponse, describe_suggestion};
