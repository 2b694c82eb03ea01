//! API error type and HTTP response conversion, grounded on
//! `orchestrator::api::error::ApiError` (status-code/code/error-type triple,
//! `IntoResponse` writing `{error,message,code}`). `stack` is included only
//! in development mode.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Engine(#[from] engine_core::EngineError),

    #[error(transparent)]
    Gear(#[from] gear::GearError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Engine(e) => match e.code() {
                "InvalidPatch" | "CycleDetected" | "InvalidUrl" => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Gear(e) => match e {
                gear::GearError::NotFound(_) => StatusCode::NOT_FOUND,
                gear::GearError::DuplicateId(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Engine(e) => e.code(),
            ApiError::Gear(e) => e.code(),
            ApiError::Storage(_) => "StorageError",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let stack = if cfg!(debug_assertions) { Some(format!("{self:?}")) } else { None };
        let body = ApiErrorBody { error: ApiErrorDetail { message: self.to_string(), code: self.code().to_string(), stack } };

        tracing::error!(code = self.code(), %status, "api error");

        (status, Json(body)).into_response()
    }
}
