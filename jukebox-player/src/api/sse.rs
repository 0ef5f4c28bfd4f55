//! Server-Sent Events (SSE) broadcaster
//!
//! Streams jukebox events to connected clients, optionally restricted to
//! one session.

use crate::api::server::AppContext;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use jukebox_common::SessionId;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    /// Only forward events of this session
    pub session_id: Option<SessionId>,
}

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
    Query(filter): Query<EventFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(session = ?filter.session_id, "New SSE client connected");

    let rx = ctx.jukebox.events().subscribe();
    let only = filter.session_id;

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) => {
                if only.is_some_and(|id| id != event.session_id()) {
                    return None;
                }
                match serde_json::to_string(&event) {
                    Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
                    Err(e) => {
                        warn!("Failed to serialize event: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                // Lagged; the client keeps the stream
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
