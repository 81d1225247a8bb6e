//! Storage layer: a SQLite key-value blob table and the typed stores built
//! on top of it.

pub mod events;
pub mod kv;
pub mod messages;

pub use events::EventStore;
pub use kv::{
    KEY_CHAT_API_URL, KEY_CHAT_MESSAGES, KEY_LOGGED_IN_USER, KEY_USE_FALLBACK_CHAT, KEY_USERS,
    KvStore, events_key,
};
pub use messages::MessageLog;
