//! Event broadcaster
//!
//! Process-wide fan-out hub between mutation handlers and connected
//! event-stream observers. Constructed once at startup and handed to
//! the router state; there is no ambient global.
//!
//! Delivery is best-effort: each subscriber owns a bounded queue,
//! `publish` never awaits, a closed sink is dropped from the registry
//! and a full sink loses that one event. One slow or dead observer
//! never affects the others and never fails a mutation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::{ChangeEvent, EventEnvelope};

/// Buffered events per subscriber before drop-new kicks in.
const SINK_CAPACITY: usize = 64;

/// Fan-out hub for [`EventEnvelope`]s. Cheap to clone; clones share
/// the same subscriber registry.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

struct Inner {
    sinks: Mutex<HashMap<u64, mpsc::Sender<EventEnvelope>>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                sinks: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register a new observer. Events published after this call are
    /// delivered to the returned subscription in publish order.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(SINK_CAPACITY);
        self.inner.sinks.lock().insert(id, tx);
        debug!(subscriber = id, "event stream subscribed");
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber from the registry. Idempotent: unknown or
    /// already-removed ids are a no-op.
    pub fn unsubscribe(&self, id: u64) {
        if self.inner.sinks.lock().remove(&id).is_some() {
            debug!(subscriber = id, "event stream unsubscribed");
        }
    }

    /// Deliver an event to every registered sink. Sinks whose receiver
    /// is gone are removed; sinks with a full buffer skip this event.
    pub fn publish(&self, event: EventEnvelope) {
        let mut sinks = self.inner.sinks.lock();
        sinks.retain(|id, tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(subscriber = id, "sink full, event dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(subscriber = id, "sink closed, removing");
                false
            }
        });
    }

    /// Publish a terminal shutdown event and clear the registry, ending
    /// every observer's receive loop.
    pub fn shutdown(&self) {
        self.publish(EventEnvelope::new(ChangeEvent::Shutdown, None));
        self.inner.sinks.lock().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sinks.lock().len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// One observer's end of the hub.
///
/// Unsubscribes itself when dropped, so every exit route of a receive
/// loop (normal end, error, client disconnect) cleans up the registry.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<EventEnvelope>,
    hub: Weak<Inner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, or `None` once the hub has dropped this sink.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.sinks.lock().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeEvent;

    fn ping() -> EventEnvelope {
        EventEnvelope::new(ChangeEvent::Ping, None)
    }

    fn cleared(list_id: i64) -> EventEnvelope {
        EventEnvelope::new(ChangeEvent::Cleared { list_id }, None)
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_publish_order() {
        let hub = Broadcaster::new();
        let mut sub = hub.subscribe();

        for list_id in 1..=3 {
            hub.publish(cleared(list_id));
        }

        for list_id in 1..=3 {
            let received = sub.recv().await.unwrap();
            assert_eq!(received.event, ChangeEvent::Cleared { list_id });
        }
    }

    #[tokio::test]
    async fn test_events_before_subscribe_are_not_delivered() {
        let hub = Broadcaster::new();
        hub.publish(cleared(1));

        let mut sub = hub.subscribe();
        hub.publish(cleared(2));
        assert_eq!(
            sub.recv().await.unwrap().event,
            ChangeEvent::Cleared { list_id: 2 }
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let hub = Broadcaster::new();
        let sub = hub.subscribe();
        let id = sub.id();

        hub.unsubscribe(id);
        hub.unsubscribe(id);
        hub.unsubscribe(9999);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let hub = Broadcaster::new();
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_survives_dropped_subscriber() {
        let hub = Broadcaster::new();
        let dropped = hub.subscribe();
        let mut alive_a = hub.subscribe();
        let mut alive_b = hub.subscribe();

        drop(dropped);
        hub.publish(cleared(5));

        assert_eq!(
            alive_a.recv().await.unwrap().event,
            ChangeEvent::Cleared { list_id: 5 }
        );
        assert_eq!(
            alive_b.recv().await.unwrap().event,
            ChangeEvent::Cleared { list_id: 5 }
        );
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_full_sink_drops_event_but_stays_registered() {
        let hub = Broadcaster::new();
        let mut slow = hub.subscribe();

        for _ in 0..SINK_CAPACITY + 10 {
            hub.publish(ping());
        }
        assert_eq!(hub.subscriber_count(), 1);

        let mut received = 0;
        while slow.rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, SINK_CAPACITY);
    }

    #[tokio::test]
    async fn test_shutdown_delivers_terminal_event_and_clears_registry() {
        let hub = Broadcaster::new();
        let mut sub_a = hub.subscribe();
        let mut sub_b = hub.subscribe();

        hub.shutdown();
        assert_eq!(hub.subscriber_count(), 0);

        assert!(sub_a.recv().await.unwrap().is_terminal());
        assert!(sub_b.recv().await.unwrap().is_terminal());
        // Registry was cleared, so the channel is closed afterwards.
        assert!(sub_a.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_with_no_subscribers_is_fine() {
        let hub = Broadcaster::new();
        hub.publish(ping());
        assert_eq!(hub.subscriber_count(), 0);
    }
}
