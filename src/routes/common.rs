//! Liveness, readiness and build info.

use crate::state::AppState;
use crate::store;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the banking tables answer a query.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    match store::is_empty(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(Probe { status: "ok", database: "ok" }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "banking tables unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Probe { status: "degraded", database: "unavailable" }),
            )
        }
    }
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
