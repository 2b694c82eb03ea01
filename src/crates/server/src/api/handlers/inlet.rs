//! The Inlet Endpoint: triggers a patch run and streams its
//! `RunEvent` sequence to the caller as SSE. Grounded on
//! `orchestrator::execution::streaming::ExecutionStreamHandler`'s
//! event-to-SSE-frame conversion, reshaped around `engine_core::RunOutcome`
//! instead of the teacher's workflow execution state machine.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use engine_core::{PatchDefinition, RunEvent, RunOutcome, RunStartupError};
use serde_json::Value;
use tokio_stream::StreamExt;

use crate::error::ApiError;
use crate::patch_record::StoredPatch;
use crate::state::AppState;
use crate::storage::patch_key;

/// `POST /inlet/{id}`. Id/body validation fails fast with 4xx; a patch load
/// failure *after* that point still returns `200` with a
/// single-event `error` SSE stream, since the stream itself is the contract
/// once the inlet has committed to responding.
pub async fn inlet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: axum::body::Bytes,
) -> axum::response::Response {
    if id.trim().is_empty() {
        return ApiError::BadRequest("Invalid patch ID".to_string()).into_response();
    }

    let initial_input: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return ApiError::BadRequest("Invalid JSON payload".to_string()).into_response(),
    };

    let patch = match load_patch(&state, &id).await {
        Ok(patch) => patch,
        Err(startup_error) => return single_event_error_stream(startup_error).into_response(),
    };

    match state.patch_engine.try_run(patch, initial_input) {
        RunOutcome::Started(events) => event_stream(events).into_response(),
        RunOutcome::StartupFailed(startup_error) => single_event_error_stream(startup_error).into_response(),
    }
}

async fn load_patch(state: &AppState, id: &str) -> Result<PatchDefinition, RunStartupError> {
    let not_found = |msg: String| RunStartupError { error: msg, code: "NotFound".to_string() };

    let value = state
        .storage
        .get(&patch_key(id))
        .await
        .map_err(|e| not_found(e.to_string()))?
        .ok_or_else(|| not_found(format!("patch '{id}' not found")))?;

    let stored: StoredPatch = serde_json::from_value(value).map_err(|e| not_found(e.to_string()))?;
    Ok(stored.into_definition())
}

fn event_stream(events: engine_core::RunEventStream) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let stream = events.map(|event: RunEvent| {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default().data(payload))
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(30)).text("ping"))
}

/// A committed-but-fatal stream: one `error` SSE frame, then close.
fn single_event_error_stream(
    startup_error: RunStartupError,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let payload = serde_json::to_string(&startup_error).unwrap_or_else(|_| "{}".to_string());
    let event = Event::default().event("error").data(payload);
    let stream = futures::stream::once(async move { Ok(event) });
    Sse::new(stream)
}
