//! Upstream forwarding.
//!
//! The body is sent as the raw bytes received: no parsing, no
//! re-serialization. No retry is attempted on failure.

use std::time::Instant;

use axum::http::{header, HeaderMap, Method};
use bytes::Bytes;
use tracing::Instrument;

use super::error::ProxyError;

/// A fully translated request ready to be sent upstream.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Whether the inbound body is forwarded for this method.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Send the request upstream. Any completed round trip is `Ok`, whatever its
/// status; only transport failures are errors.
pub async fn send(
    client: &reqwest::Client,
    request: ForwardedRequest,
    request_id: &str,
) -> Result<reqwest::Response, ProxyError> {
    let span = beview_tracing::upstream_forward_span!(request_id, &request.url);
    let start = Instant::now();

    async move {
        // Body framing is recomputed by the HTTP client
        let mut headers = request.headers;
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);

        let mut req_builder = client.request(request.method, &request.url).headers(headers);
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let result = req_builder.send().await;

        let latency = start.elapsed().as_millis() as u64;
        tracing::Span::current().record("latency_ms", latency);

        match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                tracing::Span::current().record("status", status);
                tracing::info!(status = status, latency_ms = latency, "Forward complete");
                Ok(resp)
            }
            Err(e) => {
                tracing::Span::current().record("status", 0_u16);
                tracing::error!(error = %e, latency_ms = latency, "Upstream request failed");
                Err(ProxyError::failure(error_chain(&e)))
            }
        }
    }
    .instrument(span)
    .await
}

/// Render an error with its sources, e.g. `error sending request: connection refused`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
