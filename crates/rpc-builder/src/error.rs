//! Translates the core error taxonomy (`gateway_rpc::ApiError`, spec §7)
//! to an HTTP status and a plain-text body at the transport boundary.
//! Subscription tasks never go through this after the WebSocket upgrade
//! (§4.9, §7 "Propagation").

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway_rpc::ApiError;

/// Newtype so we can implement `IntoResponse` for a foreign error type
/// without `gateway-rpc` taking a dependency on `axum`.
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::LimitExceeded(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Collaborator(msg) => {
                tracing::error!(error = %msg, "collaborator failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            // Subscriptions never translate these to HTTP (§7); reachable
            // here only if a future handler misuses `ApiError` outside a
            // WebSocket context, so fail closed rather than panic.
            ApiError::ClientClosed | ApiError::Shutdown => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        // Error bodies are plain text with a trailing newline (§6.2).
        (status, format!("{message}\n")).into_response()
    }
}

/// A request body over [`crate::ServerConfig::request_body_limit_bytes`]
/// (§6.2 `413`), raised by `tower_http::limit::RequestBodyLimitLayer`
/// before a handler ever runs; kept here so every transport-level error
/// shares the same plain-text-with-newline convention.
pub fn payload_too_large() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, "request body too large\n".to_string()).into_response()
}

pub fn request_timeout() -> Response {
    (StatusCode::REQUEST_TIMEOUT, "request timeout\n".to_string()).into_response()
}

pub fn genesis_id_mismatch() -> Response {
    (StatusCode::FORBIDDEN, "genesis id mismatch\n".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn invalid_input_maps_to_400_with_trailing_newline() {
        let response = HttpError(ApiError::invalid_input("invalid address")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "invalid address\n".as_bytes());
    }

    #[tokio::test]
    async fn limit_exceeded_maps_to_403() {
        let response = HttpError(ApiError::limit_exceeded("too many")).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn collaborator_failure_hides_detail_behind_500() {
        let response = HttpError(ApiError::Collaborator("disk full".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "internal server error\n".as_bytes());
    }
}
