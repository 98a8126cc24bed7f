//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_kernel::ErrorCode;
use domain_org::OrgError;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::contract::ContractError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// HTTP status reported for an error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::PermissionDenied | ErrorCode::MissingAttribute => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::AlreadyExists
        | ErrorCode::AlreadyBound
        | ErrorCode::KeyTaken
        | ErrorCode::DuplicateLogEntry
        | ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InvalidAmount
        | ErrorCode::InsufficientBalance
        | ErrorCode::UnsupportedKeyType
        | ErrorCode::InvalidKey
        | ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::UnknownFunction | ErrorCode::InvalidArguments => StatusCode::BAD_REQUEST,
        ErrorCode::DecodeError | ErrorCode::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest".to_string(), None),
            ApiError::Contract(e) => {
                let code = e.code();
                (status_for(code), code.to_string(), validation_details(e))
            }
        };

        let body = ErrorResponse {
            error: error_type,
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

fn validation_details(error: &ContractError) -> Option<Vec<String>> {
    match error {
        ContractError::Org(OrgError::Validation(errors)) => {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            fields.sort();
            Some(fields)
        }
        _ => None,
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
