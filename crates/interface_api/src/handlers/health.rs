//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the ledger store)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthCheckResult>, StatusCode> {
    let result = state.gateway.ledger().health_check().await;
    match result.status {
        AdapterHealth::Unhealthy => Err(StatusCode::SERVICE_UNAVAILABLE),
        AdapterHealth::Healthy | AdapterHealth::Degraded => Ok(Json(result)),
    }
}
