//! HTTP API: router, REST handlers, and the SSE event stream

pub mod http;
pub mod rest;
pub mod sse;

use crate::broadcast::Broadcaster;
use crate::store::Store;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub events: Broadcaster,
}

impl AppState {
    pub fn new(store: Store, events: Broadcaster) -> Self {
        Self { store, events }
    }
}
