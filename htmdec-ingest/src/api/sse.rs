//! Server-Sent Events for import notifications and progress

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// GET /events
///
/// Streams every bus event: resource notifications and import progress.
/// Lagging clients lose the overflowed events and keep streaming.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: client lagged, {} events dropped", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let event_type = event.event_type();
            match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("SSE: Broadcasting event: {}", event_type);
                    yield Ok(Event::default().event(event_type).data(json));
                }
                Err(e) => {
                    warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                }
            }
        }
        debug!("SSE: event bus closed");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
