//! Patch CRUD (`POST/GET/PUT/DELETE /patches`), grounded on the
//! orchestrator's task/workflow CRUD handler shape (load-or-404, 409 on
//! duplicate create, cascade delete with per-child failures logged rather
//! than aborting).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use engine_core::PatchSummary;
use serde_json::Value;

use crate::api::response;
use crate::error::{ApiError, ApiResult};
use crate::patch_record::StoredPatch;
use crate::state::AppState;
use crate::storage::{gear_key, patch_key};

pub async fn create_patch(State(state): State<AppState>, Json(mut body): Json<StoredPatch>) -> ApiResult<impl IntoResponse> {
    let key = patch_key(&body.id);
    if state.storage.get(&key).await?.is_some() {
        return Err(ApiError::Conflict(format!("patch '{}' already exists", body.id)));
    }

    let now = Utc::now();
    body.created_at = now;
    body.updated_at = now;

    let value = serde_json::to_value(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.storage.put(&key, value).await?;
    Ok(response::created(body))
}

pub async fn list_patches(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let keys = state.storage.list_keys("patch:").await?;
    let mut summaries = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(value) = state.storage.get(&key).await? {
            let stored: StoredPatch = serde_json::from_value(value).map_err(|e| ApiError::Internal(e.to_string()))?;
            let definition = stored.into_definition();
            summaries.push(PatchSummary::from(&definition));
        }
    }
    Ok(response::ok(summaries))
}

pub async fn get_patch(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let stored = load_patch(&state, &id).await?;
    Ok(response::ok(stored))
}

pub async fn update_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let mut stored = load_patch(&state, &id).await?;

    if let Some(name) = patch.get("name").and_then(Value::as_str) {
        stored.name = name.to_string();
    }
    if let Some(description) = patch.get("description").and_then(Value::as_str) {
        stored.description = Some(description.to_string());
    }
    if let Some(nodes) = patch.get("nodes") {
        stored.nodes = serde_json::from_value(nodes.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }
    if let Some(edges) = patch.get("edges") {
        stored.edges = serde_json::from_value(edges.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }
    stored.updated_at = Utc::now();

    let value = serde_json::to_value(&stored).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.storage.put(&patch_key(&id), value).await?;
    Ok(response::ok(serde_json::json!({ "id": id, "updated": true })))
}

/// Deletes the patch, then attempts to delete every gear its nodes link to.
/// Per-gear cascade failures are logged but never abort the patch deletion
/// itself.
pub async fn delete_patch(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let stored = load_patch(&state, &id).await?;
    state.storage.delete(&patch_key(&id)).await?;

    for gear_id in stored.gear_ids() {
        if let Err(e) = state.storage.delete(&gear_key(&gear_id)).await {
            tracing::warn!(patch_id = %id, gear_id = %gear_id, error = %e, "cascade gear delete failed");
        }
    }

    Ok(response::ok(serde_json::json!({ "id": id, "deleted": true })))
}

async fn load_patch(state: &AppState, id: &str) -> ApiResult<StoredPatch> {
    let value = state
        .storage
        .get(&patch_key(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("patch '{id}' not found")))?;
    serde_json::from_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}
