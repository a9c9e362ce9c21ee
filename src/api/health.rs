use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

async fn check_all_health(state: &AppState) -> (StatusCode, Json<HealthResponse>) {
    let storage_healthy = state.health_check().await;
    debug!("Health check: storage healthy = {}", storage_healthy);

    let response = HealthResponse {
        status: if storage_healthy { "ok" } else { "error" },
        storage: if storage_healthy { "ok" } else { "error" },
    };
    let status_code = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is not healthy", body = HealthResponse)
    )
)]
pub(crate) async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    check_all_health(&state).await
}

/// Ready check handler - alias to health check
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    check_all_health(&state).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}
