// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model collection events over Server-Sent Events.

use crate::types::SnapshotEvent;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use frag_viewer_core::FragmentEngine;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

/// GET /api/v1/events - Stream collection changes.
///
/// Opens with a `snapshot` event listing the resident models, followed by a
/// `model` event per set or delete.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let models = state.viewer.engine().models();
    let mut events = models.subscribe();
    let snapshot = SnapshotEvent {
        models: models.keys(),
    };

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(json_event("snapshot", &snapshot));
        loop {
            match events.recv().await {
                Ok(event) => yield Ok(json_event("model", &event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged, dropping events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    match serde_json::to_string(payload) {
        Ok(json) => Event::default().event(name).data(json),
        Err(e) => Event::default().event("error").data(e.to_string()),
    }
}
