//! Change events broadcast to connected clients
//!
//! Events are ephemeral: they describe one committed mutation and are
//! published for real-time fan-out, never persisted.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Item;

/// One state mutation, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A new item was created
    Created { item: Item },

    /// An item's fields were updated (possibly including its position)
    Updated { item: Item },

    /// An item was deleted
    Deleted { list_id: i64, item_id: i64 },

    /// An item's completed flag was flipped
    Toggled {
        list_id: i64,
        item_id: i64,
        completed: bool,
    },

    /// An item was moved to a new position
    Reordered {
        list_id: i64,
        item_id: i64,
        from_position: i64,
        to_position: i64,
    },

    /// All items of a list were removed
    Cleared { list_id: i64 },

    /// A list was renamed
    ListRenamed { list_id: i64, name: String },

    /// Keep-alive heartbeat for idle event streams
    Ping,

    /// Terminal event: the server is shutting down
    Shutdown,
}

/// Envelope carrying a [`ChangeEvent`] plus delivery metadata.
///
/// `client` is the originating client's token, echoed back so consumers
/// can ignore events caused by their own requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub event: ChangeEvent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    /// Unix timestamp when the event was created
    pub timestamp: i64,
}

impl EventEnvelope {
    pub fn new(event: ChangeEvent, client: Option<String>) -> Self {
        Self {
            event,
            client,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Terminal events end every subscriber's receive loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self.event, ChangeEvent::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let envelope = EventEnvelope::new(
            ChangeEvent::Toggled {
                list_id: 1,
                item_id: 7,
                completed: true,
            },
            Some("client-a".to_string()),
        );

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""type":"toggled""#));
        assert!(json.contains(r#""client":"client-a""#));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_client_token_omitted_when_absent() {
        let envelope = EventEnvelope::new(ChangeEvent::Ping, None);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(!json.contains("client"));
    }

    #[test]
    fn test_shutdown_is_terminal() {
        assert!(EventEnvelope::new(ChangeEvent::Shutdown, None).is_terminal());
        assert!(!EventEnvelope::new(ChangeEvent::Ping, None).is_terminal());
    }
}
