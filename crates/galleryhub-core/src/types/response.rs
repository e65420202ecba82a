//! Uniform `{success, data?, error?}` envelope returned to callers.
//!
//! Policy rejections and authorization failures are carried as data. Server
//! faults are logged with full detail and masked to a generic message.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Message shown to callers in place of server-side failure details.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Error body of a [`ServiceResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Machine-readable error code.
    pub code: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Optional details (tier, limit, current count...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Caller-facing result of an engine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

impl<T> ServiceResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response built from an error.
    ///
    /// Server faults are logged here and their message replaced.
    pub fn failure(err: AppError) -> Self {
        let error = if err.kind.is_server_fault() {
            tracing::error!(kind = %err.kind, error = ?err, "Operation failed");
            ServiceError {
                code: err.kind,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
                details: None,
            }
        } else {
            ServiceError {
                code: err.kind,
                message: err.message,
                details: err.details,
            }
        };

        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Build a response from a service result.
    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(err),
        }
    }

    /// Error code, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.code)
    }

    /// Convert back into a `Result`, discarding the envelope.
    pub fn into_result(self) -> Result<T, ServiceError> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err(ServiceError {
                code: ErrorKind::Internal,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
                details: None,
            }),
        }
    }
}

impl<T> From<Result<T, AppError>> for ServiceResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        Self::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_shape() {
        let resp = ServiceResponse::ok(7u32);
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json, serde_json::json!({"success": true, "data": 7}));
    }

    #[test]
    fn test_policy_failure_keeps_message_and_details() {
        let err = AppError::quota_exceeded("Free plan allows 2 active galleries")
            .with_details(serde_json::json!({"tier": "free", "limit": 2}));
        let resp: ServiceResponse<()> = ServiceResponse::failure(err);
        assert!(!resp.success);
        let error = resp.error.expect("error");
        assert_eq!(error.code, ErrorKind::QuotaExceeded);
        assert_eq!(error.message, "Free plan allows 2 active galleries");
        assert_eq!(
            error.details,
            Some(serde_json::json!({"tier": "free", "limit": 2}))
        );
    }

    #[test]
    fn test_server_fault_is_masked() {
        let err = AppError::database("relation \"galleries\" does not exist");
        let resp: ServiceResponse<()> = ServiceResponse::failure(err);
        let error = resp.error.expect("error");
        assert_eq!(error.code, ErrorKind::Database);
        assert_eq!(error.message, GENERIC_FAILURE_MESSAGE);
    }
}
