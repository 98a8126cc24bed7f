//! Invocation handler

use axum::{extract::State, Extension, Json};

use crate::auth::Claims;
use crate::dto::invoke::InvokeRequest;
use crate::error::ApiError;
use crate::gateway::Invocation;
use crate::AppState;

/// Submits one ledger invocation as the authenticated caller
pub async fn invoke(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<InvokeRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<Invocation>, ApiError> {
    let Json(request) = body?;
    let invocation = state
        .gateway
        .invoke(claims.identity(), &request.function, &request.args)
        .await?;
    Ok(Json(invocation))
}
