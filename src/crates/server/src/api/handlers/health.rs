//! `GET /healthz`, grounded on `orchestrator::api::handlers::health` — a
//! bare liveness probe with no downstream dependency check, since this
//! crate's only "downstream" is the opaque Storage Adapter it already owns
//! in-process.

use axum::response::IntoResponse;
use serde_json::json;

pub async fn healthz() -> impl IntoResponse {
    crate::api::response::ok(json!({ "status": "ok" }))
}
