//! Relay of the upstream response back to the caller.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName};
use axum::response::Response;

use super::cors;
use super::error::ProxyError;

/// Connection-level headers that describe the upstream hop, not the payload.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Read the upstream body fully and build the caller's response: upstream
/// status, upstream headers with the CORS set laid over them, body untouched.
pub async fn relay(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let status = upstream.status();

    let mut headers = HeaderMap::with_capacity(upstream.headers().len());
    for (name, value) in upstream.headers() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    cors::apply(&mut headers);

    let body = upstream.bytes().await.map_err(|e| {
        tracing::error!(error = %e, status = status.as_u16(), "Failed to read upstream body");
        ProxyError::failure(super::forward::error_chain(&e))
    })?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
