//! API error type that maps [`SubwatchError`] variants to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use subwatch_types::SubwatchError;

/// Wrapper around [`SubwatchError`] that implements [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub SubwatchError);

impl ApiError {
    /// Returns `(status, error_type, error_code)` for the wrapped error.
    fn classify(&self) -> (StatusCode, &'static str, &'static str) {
        match &self.0 {
            SubwatchError::MissingCredential => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "authentication_error",
                "missing_credential",
            ),
            SubwatchError::UpstreamAuth(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "authentication_error",
                "token_refresh_failed",
            ),
            SubwatchError::UpstreamApi { .. } => {
                (StatusCode::BAD_GATEWAY, "upstream_error", "twitch_api_error")
            }
            SubwatchError::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "upstream_unreachable",
            ),
            SubwatchError::InvalidCallback(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_callback",
            ),
            SubwatchError::MissingScopes(_) => {
                (StatusCode::FORBIDDEN, "permission_error", "missing_scopes")
            }
            SubwatchError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "storage_error",
            ),
            SubwatchError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "configuration_error",
            ),
            SubwatchError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "internal_error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, error_code) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code = error_code, "request failed");
        } else {
            tracing::warn!(error = %self.0, code = error_code, "request rejected");
        }
        let msg = self.0.to_string();
        (
            status,
            Json(json!({
                "error": {
                    "message": msg,
                    "type": error_type,
                    "code": error_code,
                }
            })),
        )
            .into_response()
    }
}

impl From<SubwatchError> for ApiError {
    fn from(e: SubwatchError) -> Self {
        Self(e)
    }
}
