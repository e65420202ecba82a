//! Maps domain errors and service envelopes to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use galleryhub_core::error::{AppError, ErrorKind};
use galleryhub_core::result::AppResult;
use galleryhub_core::types::ServiceResponse;

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::PolicyViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Scheduler => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error raised before a request reaches the engine (bad headers, bad
/// body), rendered with the same envelope as service failures.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ServiceReply(ServiceResponse::<()>::failure(self.0)).into_response()
    }
}

/// A [`ServiceResponse`] rendered as JSON with a status derived from its
/// error code.
#[derive(Debug)]
pub struct ServiceReply<T>(pub ServiceResponse<T>);

impl<T> From<ServiceResponse<T>> for ServiceReply<T> {
    fn from(resp: ServiceResponse<T>) -> Self {
        Self(resp)
    }
}

impl<T> From<AppResult<T>> for ServiceReply<T> {
    fn from(result: AppResult<T>) -> Self {
        Self(ServiceResponse::from_result(result))
    }
}

impl<T: Serialize> IntoResponse for ServiceReply<T> {
    fn into_response(self) -> Response {
        let status = self
            .0
            .error_kind()
            .map(status_for)
            .unwrap_or(StatusCode::OK);
        (status, Json(self.0)).into_response()
    }
}
