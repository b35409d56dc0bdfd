//! Liveness and metrics endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_telemetry::HealthStatus;

use crate::api::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut status = HealthStatus::new();
    status.add_check("postgres", state.infra.check_postgres_connection().await, None);

    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let checks: Vec<_> = status
        .checks
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "healthy": c.healthy,
                "message": c.message,
            })
        })
        .collect();

    (
        code,
        Json(serde_json::json!({
            "healthy": status.healthy,
            "checks": checks,
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
