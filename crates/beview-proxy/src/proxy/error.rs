//! Proxy error types and their client-facing responses.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use super::cors;

/// Failures that end a request before an upstream response can be relayed.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Inbound path does not contain the mount marker.
    #[error("Invalid endpoint. Use /{mount}/path-to-endpoint")]
    BadRequest { mount: String },

    /// Transport-level failure reaching upstream or reading either body.
    #[error("Failed to proxy request: {details}")]
    ProxyFailure { details: String },
}

impl ProxyError {
    pub fn bad_request(mount: &str) -> Self {
        ProxyError::BadRequest {
            mount: mount.to_string(),
        }
    }

    pub fn failure(details: impl std::fmt::Display) -> Self {
        ProxyError::ProxyFailure {
            details: details.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ProxyError::ProxyFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> String {
        let message = self.to_string();
        let body = match self {
            ProxyError::BadRequest { .. } => ErrorBody {
                error: &message,
                details: None,
            },
            ProxyError::ProxyFailure { details } => ErrorBody {
                error: "Failed to proxy request",
                details: Some(details.as_str()),
            },
        };
        serde_json::to_string(&body).unwrap_or_else(|_| format!(r#"{{"error":"{message}"}}"#))
    }
}

/// JSON error payload; field order is part of the wire format.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::BadRequest { .. } => tracing::warn!(error = %self, "Rejected request"),
            ProxyError::ProxyFailure { details } => {
                tracing::error!(details = %details, "Proxy error")
            }
        }

        let mut response = (self.status(), self.body()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        cors::apply(headers);
        response
    }
}

/// Failures on the best-effort audit path. Never reach the client.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("identity lookup failed: {0}")]
    Identity(String),

    #[error("audit store rejected record: {0}")]
    Store(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
