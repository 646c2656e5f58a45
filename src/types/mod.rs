//! Data types for the shopping list service
//!
//! Row types mirror the database schema; draft types are the request
//! payloads accepted by the REST handlers.

mod event;
mod item;
mod list;

pub use event::{ChangeEvent, EventEnvelope};
pub use item::{Item, ItemDraft};
pub use list::{List, ListRename};
