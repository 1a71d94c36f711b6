use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::ErrorResponse;
use shared::sessions::SessionError;
use tracing::{error, warn};

fn error_response(status: StatusCode, code: &str, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(code: &str, detail: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, code, detail)
}

/// Malformed request bodies rejected by an extractor keep the extractor's status code.
pub(super) fn validation_error_response(status: StatusCode, detail: String) -> Response {
    warn!(status = status.as_u16(), "request rejected: {detail}");
    error_response(status, "invalid_request", detail)
}

pub(super) fn internal_error_response(detail: String) -> Response {
    error!("request failed: {detail}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", detail)
}

pub(super) fn session_error_response(err: SessionError) -> Response {
    match err {
        SessionError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "session_not_found", "Session not found.")
        }
        SessionError::GatewayTimeout => error_response(
            StatusCode::GATEWAY_TIMEOUT,
            "upstream_timeout",
            "The request to Google Gen AI timed out. Please try again later.",
        ),
        SessionError::Upstream(cause) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "upstream_failed",
            format!("Failed to communicate with Google Gen AI: {cause}"),
        ),
    }
}
