//! Hub error types with HTTP status code mapping.
//!
//! [`HubError`] is the error type every HTTP handler returns. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! None of these errors are raised while the hub's membership lock is held.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::credential_service::CredentialError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "unauthorized: credential expired",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status               |
/// |-----------|----------------|---------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request           |
/// | 2000–2999 | Authorization  | 401 Unauthorized          |
/// | 3000–3999 | Server         | 500 / transport failures  |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Request body or parameters were missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection credential was missing, invalid, or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] CredentialError),

    /// The HTTP request could not be promoted to a WebSocket.
    #[error("websocket upgrade failed: {0}")]
    UpgradeFailed(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized(_) => 2001,
            Self::Internal(_) => 3000,
            Self::UpgradeFailed(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UpgradeFailed(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            HubError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HubError::Unauthorized(CredentialError::Missing).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HubError::UpgradeFailed("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HubError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn into_response_carries_status() {
        let response = HubError::Unauthorized(CredentialError::Expired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
