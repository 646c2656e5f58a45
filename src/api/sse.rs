//! Server-sent event stream
//!
//! `GET /events` pushes every change event to the client as one JSON
//! message per SSE frame. The loop alternates between "await the next
//! event for up to 30s" and "emit a synthetic ping", so idle
//! connections are not reclaimed by proxies. A shutdown event is
//! forwarded once and ends the stream; the subscription unsubscribes
//! itself when the stream is dropped, including on client disconnect.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::Stream;
use tokio::time::timeout;
use tracing::debug;

use super::AppState;
use crate::types::{ChangeEvent, EventEnvelope};

/// Idle interval after which a keep-alive ping is sent.
const KEEP_ALIVE: Duration = Duration::from_secs(30);

fn frame(envelope: &EventEnvelope) -> Event {
    Event::default().data(serde_json::to_string(envelope).unwrap_or_default())
}

fn ping() -> EventEnvelope {
    EventEnvelope::new(ChangeEvent::Ping, None)
}

/// GET /events - long-lived stream of change events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.events.subscribe();
    let subscriber = subscription.id();

    let stream = async_stream::stream! {
        // Initial ping confirms the stream is live before any event.
        yield Ok::<_, Infallible>(frame(&ping()));

        loop {
            match timeout(KEEP_ALIVE, subscription.recv()).await {
                Ok(Some(envelope)) => {
                    let terminal = envelope.is_terminal();
                    yield Ok(frame(&envelope));
                    if terminal {
                        debug!(subscriber, "shutdown received, closing event stream");
                        break;
                    }
                }
                Ok(None) => {
                    // Hub dropped this sink (registry cleared).
                    break;
                }
                Err(_elapsed) => {
                    yield Ok(frame(&ping()));
                }
            }
        }
    };

    Sse::new(stream)
}
