//! dayplan-core: calendar assistant core library
//!
//! The event store and its normalization boundary, the calendar view model
//! (month grid, week/day time grids, mini calendar), the chat assistant
//! state machine with its remote-or-fallback modes, and the demo
//! authentication flow.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod store;
pub mod view;

pub use auth::{AuthError, AuthService, User};
pub use chat::{Assistant, ChatClient, ChatMessage, ConnectionStatus};
pub use config::{ChatConfig, Config, StorageConfig};
pub use error::{Error, Result};
pub use event::{Event, EventDraft};
pub use store::{EventStore, KvStore, MessageLog};
pub use view::{MiniCalendar, MonthGrid, TimeGrid, ViewMode, ViewState};
