//! Small response helpers, grounded on `orchestrator::api::response`'s
//! `ok`/`created` helper functions (stripped of the generic
//! `SuccessResponse<T>` envelope, since each endpoint's JSON shape is
//! specified literally rather than via a common wrapper).

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(data))
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(data))
}
