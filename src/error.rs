//! Relay error taxonomy.
//!
//! Every failure that can end a chat request is a [`RelayError`]. Each
//! variant maps to exactly one HTTP status and is rendered to the caller as
//!
//! ```json
//! { "error": "Field 'message' is required and must be a non-empty string." }
//! ```
//!
//! | Variant | Status |
//! |---------|--------|
//! | `Configuration` | 500 |
//! | `BadRequest` | 400 |
//! | `Transport` | 500 |
//! | `RemoteService` | 500 |
//! | `InvalidResponse` | 500 |
//!
//! Messages are passed through unredacted, including upstream error text.
//! The relay is meant to sit behind a trusted frontend.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Content type for every body the relay writes.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Credential, vector store id, or instructions are missing or unusable.
    #[error("{0}")]
    Configuration(String),

    /// The inbound body failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// Connection failure or timeout talking to the completion service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The completion service answered with status >= 400.
    #[error("OpenAI HTTP {status}: {body}")]
    RemoteService { status: u16, body: String },

    /// The completion service answered with something other than a JSON object.
    #[error("Invalid JSON from OpenAI: {0}")]
    InvalidResponse(String),
}

impl RelayError {
    /// HTTP status for this error: 400 for [`RelayError::BadRequest`],
    /// 500 for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Configuration(_)
            | RelayError::Transport(_)
            | RelayError::RemoteService { .. }
            | RelayError::InvalidResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-friendly name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Configuration(_) => "configuration",
            RelayError::BadRequest(_) => "bad_request",
            RelayError::Transport(_) => "transport",
            RelayError::RemoteService { .. } => "remote_service",
            RelayError::InvalidResponse(_) => "invalid_response",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        json_response(self.status(), &body)
    }
}

/// Serialize `body` with the relay's `application/json; charset=utf-8` header.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = (status, bytes).into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Configuration("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Transport("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::RemoteService {
                status: 429,
                body: "{}".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::InvalidResponse("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_remote_service_message_includes_status_and_body() {
        let err = RelayError::RemoteService {
            status: 401,
            body: r#"{"error":{"message":"bad key"}}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"OpenAI HTTP 401: {"error":{"message":"bad key"}}"#
        );
    }

    #[tokio::test]
    async fn test_into_response_writes_error_body() {
        let response = RelayError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_UTF8
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "nope" }));
    }
}
