use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use payables_auth::AuthError;
use payables_core::DomainError;
use payables_infra::ServiceError;

/// Everything a handler can fail with. Rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    BadRequest(String),
    Unauthenticated,
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError::Service(value)
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        ApiError::Service(ServiceError::Domain(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

fn internal(err: &dyn std::fmt::Display) -> Response {
    error!(error = %err, "request failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(DomainError::NotFound(kind)) => {
            json_error(StatusCode::NOT_FOUND, DomainError::NotFound(kind).to_string())
        }
        ServiceError::Domain(
            e @ (DomainError::Validation(_) | DomainError::InvalidId(_) | DomainError::Conflict(_)),
        ) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        e @ ServiceError::BranchInUse { .. } => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Auth(e @ (AuthError::InvalidCredentials | AuthError::Unauthenticated)) => {
            json_error(StatusCode::UNAUTHORIZED, e.to_string())
        }
        ServiceError::Auth(e) => internal(&e),
        ServiceError::Store(e) => internal(&e),
        ServiceError::Internal(msg) => internal(&msg),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated => {
                json_error(StatusCode::UNAUTHORIZED, AuthError::Unauthenticated.to_string())
            }
        }
    }
}
