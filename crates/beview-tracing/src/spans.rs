//! Span builder helpers for proxy instrumentation.

/// Create the top-level span for one proxied request.
///
/// Usage: `let span = proxy_request_span!(request_id, method, endpoint);`
///
/// `status` and `outcome` are recorded once the terminal state is known
/// (`proxied` or `failed`).
#[macro_export]
macro_rules! proxy_request_span {
    ($request_id:expr, $method:expr, $endpoint:expr) => {
        tracing::info_span!(
            "proxy_request",
            request_id = %$request_id,
            method = %$method,
            endpoint = %$endpoint,
            status = tracing::field::Empty,
            outcome = tracing::field::Empty,
        )
    };
}

/// Create a span for the upstream round trip.
#[macro_export]
macro_rules! upstream_forward_span {
    ($request_id:expr, $target:expr) => {
        tracing::info_span!(
            "upstream_forward",
            request_id = %$request_id,
            target = %$target,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}

/// Create a span for the detached audit task.
#[macro_export]
macro_rules! audit_span {
    ($request_id:expr, $endpoint:expr, $status:expr) => {
        tracing::info_span!(
            "audit",
            request_id = %$request_id,
            endpoint = %$endpoint,
            status = $status,
            caller = tracing::field::Empty,
        )
    };
}
