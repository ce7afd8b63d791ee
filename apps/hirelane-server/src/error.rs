//! API error type and the JSON response envelope.
//!
//! Every endpoint returns `{success: bool, message?, ...payload}`. Errors
//! are handled per handler and rendered here: validation and conflicts are
//! 400, missing entities 404, failed guards 403, everything else a generic
//! 500 whose detail only reaches the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use hirelane_storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Resource not found".into()),
            StoreError::AlreadyExists => ApiError::Conflict("Already exists".into()),
            StoreError::Conflict => ApiError::Conflict("Conflict".into()),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<hirelane_billing::BillingError> for ApiError {
    fn from(e: hirelane_billing::BillingError) -> Self {
        use hirelane_billing::BillingError;
        match e {
            BillingError::UnknownPlan(name) => {
                ApiError::Validation(format!("Unknown plan: {}", name))
            }
            BillingError::InvalidSignature => {
                ApiError::Validation("Invalid payment signature".into())
            }
            BillingError::Storage(e) => e.into(),
            BillingError::Gateway(msg) | BillingError::Config(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<crate::email::EmailError> for ApiError {
    fn from(e: crate::email::EmailError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Infrastructure detail stays in the log.
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(Envelope { success: false, message })).into_response()
    }
}

#[derive(Serialize)]
struct Envelope {
    success: bool,
    message: String,
}

/// Plain `{success, message}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_notfound_maps_to_404() {
        let err: ApiError = StoreError::NotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_and_validation_are_400() {
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn guard_failure_is_403() {
        assert_eq!(
            ApiError::Forbidden("no".into()).status(),
            StatusCode::FORBIDDEN
        );
    }
}
