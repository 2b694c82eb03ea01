//! Gear CRUD, ingress, and status subscription.
//! Ingress (`POST /gears/{id}`) is the hot path: load-or-404, publish
//! `processing` via the status bus, run the gear's processing pipeline
//! under its per-gear lock, write a log entry, fire-and-forget fan-out, then
//! publish `complete`/`error`.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use gear::{Gear, Source, StatusEvent};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::response;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::storage::gear_key;

#[derive(Debug, Deserialize)]
pub struct CreateGearBody {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

pub async fn create_gear(State(state): State<AppState>, Json(body): Json<CreateGearBody>) -> ApiResult<impl IntoResponse> {
    let key = gear_key(&body.id);
    if state.storage.get(&key).await?.is_some() {
        return Err(ApiError::Conflict(format!("gear '{}' already exists", body.id)));
    }

    let gear = Gear::new(&body.id, body.label.unwrap_or_else(|| body.id.clone()));
    let value = serde_json::to_value(&gear).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.storage.put(&key, value).await?;
    Ok(response::created(gear))
}

pub async fn list_gears(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let keys = state.storage.list_keys("gear:").await?;
    let mut gears = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(value) = state.storage.get(&key).await? {
            let g: Gear = serde_json::from_value(value).map_err(|e| ApiError::Internal(e.to_string()))?;
            gears.push(g);
        }
    }
    Ok(response::ok(gears))
}

pub async fn get_gear(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let gear = load_gear(&state, &id).await?;
    Ok(response::ok(gear))
}

pub async fn update_gear(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let _lock = state.gear_locks.lock_for(&id).lock_owned().await;
    let mut gear = load_gear(&state, &id).await?;

    if let Some(label) = patch.get("label").and_then(Value::as_str) {
        gear.set_label(label);
    }
    if let Some(urls) = patch.get("outputUrls") {
        let urls: Vec<String> = serde_json::from_value(urls.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        gear.set_output_urls(urls);
    }
    if let Some(examples) = patch.get("exampleInputs") {
        let examples: Vec<gear::Example> =
            serde_json::from_value(examples.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        gear.set_example_inputs(examples);
    }
    if let Some(messages) = patch.get("messages").and_then(Value::as_array) {
        for m in messages {
            let role = m.get("role").and_then(Value::as_str).unwrap_or("user");
            let content = m.get("content").and_then(Value::as_str).unwrap_or_default();
            gear.add_message(role, content);
        }
    }

    save_gear(&state, &gear).await?;
    Ok(response::ok(json!({ "id": id, "updated": true })))
}

#[derive(Debug, Deserialize)]
pub struct IngressBody {
    /// Forwarded form.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub source_gear: Option<SourceGearBody>,
    /// Direct form.
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourceGearBody {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct IngressQuery {
    #[serde(default)]
    pub no_forward: Option<bool>,
    #[serde(default)]
    pub no_log: Option<bool>,
}

pub async fn process_gear(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IngressQuery>,
    Json(body): Json<IngressBody>,
) -> ApiResult<impl IntoResponse> {
    let lock = state.gear_locks.lock_for(&id);
    let _guard = lock.lock_owned().await;

    let mut gear = load_gear(&state, &id).await?;
    state.status_bus.publish(&id, StatusEvent::processing(json!({ "gearId": id })));

    let (input, source) = match (&body.data, &body.message) {
        (Some(data), _) => {
            let source_gear = body.source_gear.as_ref();
            let source_id = source_gear.map(|s| s.id.clone()).unwrap_or_else(|| "unknown".to_string());
            let src = source_gear
                .map(|s| Source::Gear { id: s.id.clone(), label: s.label.clone() })
                .unwrap_or_else(|| Source::Label(source_id.clone()));
            (ProcessInput::Forwarded(source_id, data.clone()), src)
        }
        (None, Some(message)) => {
            let source_label = body.source.clone().unwrap_or_else(|| "direct".to_string());
            (ProcessInput::Direct(message.clone()), Source::Label(source_label))
        }
        (None, None) => return Err(ApiError::BadRequest("body must contain 'data' or 'message'".to_string())),
    };

    let result = match &input {
        ProcessInput::Forwarded(source_id, payload) => {
            state.gear_processor.process_input(&mut gear, source_id, payload.clone()).await
        }
        ProcessInput::Direct(payload) => state.gear_processor.process(&mut gear, Some(payload.clone())).await,
    };

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            state.status_bus.publish(&id, StatusEvent::error(json!({ "message": e.to_string() })));
            return Err(ApiError::from(e));
        }
    };

    if query.no_log != Some(true) {
        let raw_input = match &input {
            ProcessInput::Forwarded(_, payload) => payload.clone(),
            ProcessInput::Direct(payload) => payload.clone(),
        };
        gear.push_log(raw_input, output.clone(), source);
    }

    save_gear(&state, &gear).await?;

    if query.no_forward != Some(true) && !gear.output_urls.is_empty() {
        let processor = state.gear_processor.clone();
        let fanout_gear = gear.clone();
        let fanout_output = output.clone();
        tokio::spawn(async move {
            processor.forward_output_to_gears(&fanout_gear, &fanout_output).await;
        });
    }

    state.status_bus.publish(&id, StatusEvent::complete(json!({ "gearId": id })));

    Ok(response::ok(json!({ "output": output })))
}

enum ProcessInput {
    Forwarded(String, Value),
    Direct(Value),
}

pub async fn gear_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    use axum::response::sse::{Event, KeepAlive, Sse};
    use tokio_stream::wrappers::ReceiverStream;
    use tokio_stream::StreamExt;

    let rx = state.status_bus.subscribe(&id);
    let stream = ReceiverStream::new(rx).map(|event| {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok::<_, std::convert::Infallible>(Event::default().data(payload))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(30)).text("ping"))
}

async fn load_gear(state: &AppState, id: &str) -> ApiResult<Gear> {
    let value = state
        .storage
        .get(&gear_key(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("gear '{id}' not found")))?;
    serde_json::from_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn save_gear(state: &AppState, gear: &Gear) -> ApiResult<()> {
    let value = serde_json::to_value(gear).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.storage.put(&gear_key(&gear.id), value).await?;
    Ok(())
}
