//! Route table, grounded on `orchestrator::api::routes::create_router`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .route("/inlet/:id", post(handlers::inlet::inlet))
        .route(
            "/gears/:id",
            post(handlers::gears::process_gear).get(handlers::gears::get_gear).put(handlers::gears::update_gear),
        )
        .route("/gears/:id/status", get(handlers::gears::gear_status))
        .route("/gears", post(handlers::gears::create_gear).get(handlers::gears::list_gears))
        .route(
            "/patches/:id",
            get(handlers::patches::get_patch).put(handlers::patches::update_patch).delete(handlers::patches::delete_patch),
        )
        .route("/patches", post(handlers::patches::create_patch).get(handlers::patches::list_patches))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
