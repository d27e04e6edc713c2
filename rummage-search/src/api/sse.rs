//! Server-Sent Events delivery for streaming searches
//!
//! One stream per request: `event: result` per completed source in
//! completion order, then a terminal `event: done` frame. Completion order
//! is non-deterministic across runs; that is the contract, not a defect.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use rummage_common::events::SearchEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Adapt a coordinator event channel into an SSE response.
///
/// The stream ends when the coordinator drops its sender, which happens
/// right after the `Done` frame.
pub fn search_stream(
    mut rx: mpsc::Receiver<SearchEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match Event::default().event(event.event_name()).json_data(&event) {
                Ok(frame) => yield Ok(frame),
                Err(e) => {
                    warn!("failed to serialize search event: {}", e);
                    yield Ok(Event::default().comment("serialization error"));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
