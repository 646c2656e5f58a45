//! Shared Shopping List Service
//!
//! A REST API over SQLite with ordered list items and live multi-client
//! synchronization over server-sent events.
//!
//! # Modules
//!
//! - `types`: Row and payload types (`List`, `Item`, `ChangeEvent`)
//! - `store`: SQLite store; its `ordering` submodule owns the per-list
//!   position index (dense 1..=n, kept correct inside transactions)
//! - `broadcast`: fan-out hub pushing change events to subscribers
//! - `api`: axum router, REST handlers and the `/events` SSE stream
//! - `config`: environment-driven server configuration
//! - `error`: store error taxonomy

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use api::{http::create_router, AppState};
pub use broadcast::{Broadcaster, Subscription};
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{MoveResult, Store};
pub use types::{ChangeEvent, EventEnvelope, Item, ItemDraft, List, ListRename};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
