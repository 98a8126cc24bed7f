//! Invocation and HTTP API Layer
//!
//! This crate exposes the credit ledger to callers.
//!
//! # Architecture
//!
//! - **Request**: decodes a function name and positional string arguments
//! - **Contract**: dispatches decoded requests to the registry and ledger
//! - **Gateway**: runs each invocation in its own committed transaction
//! - **Handlers / Middleware**: Axum routes, JWT authentication, access log
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, Gateway};
//!
//! let app = create_router(Arc::new(gateway), config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod contract;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod request;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{health, invoke};
use crate::middleware::{access_log_middleware, auth_middleware};

pub use contract::{Contract, ContractError, Response};
pub use gateway::{Gateway, Invocation};
pub use request::{CreditChange, Request};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `gateway` - Gateway running the invocations
/// * `config` - API configuration
pub fn create_router(gateway: Arc<Gateway>, config: ApiConfig) -> Router {
    let state = AppState { gateway, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Protected API routes
    let api_routes = Router::new()
        .route("/invoke", post(invoke::invoke))
        .layer(axum_middleware::from_fn(access_log_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
