//! Axum HTTP server: router, proxy handler, listener, graceful shutdown.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::proxy::audit::{self, Auditor};
use crate::proxy::error::ProxyError;
use crate::proxy::forward::{self, ForwardedRequest};
use crate::proxy::headers::{self, DefaultHeaders};
use crate::proxy::{correlation, cors, path, relay};

/// Shared application state. Read-only once the server starts.
pub struct AppState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
    pub default_headers: DefaultHeaders,
    pub auditor: Option<Auditor>,
}

impl AppState {
    pub fn new(
        config: ProxyConfig,
        client: reqwest::Client,
        auditor: Option<Auditor>,
    ) -> anyhow::Result<Self> {
        let default_headers = DefaultHeaders::from_config(&config.platform_headers)?;
        Ok(Self {
            config,
            client,
            default_headers,
            auditor,
        })
    }
}

/// Build the router. Everything except `GET /health` goes to the proxy handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health).fallback(handle_proxy))
        .fallback(handle_proxy)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "beview-proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("beview-proxy shut down gracefully");
    Ok(())
}

/// Catch-all proxy handler.
///
/// 1. Answer CORS preflight immediately
/// 2. Translate the path to an upstream URL
/// 3. Assemble headers and read the body (non-GET/HEAD only)
/// 4. Forward upstream
/// 5. Dispatch the audit without waiting on it
/// 6. Relay the upstream response with CORS headers
async fn handle_proxy(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.method() == Method::OPTIONS {
        return cors::preflight_response();
    }

    match proxy_request(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn proxy_request(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let endpoint = path::endpoint_path(parts.uri.path(), &state.config.upstream.mount)?;
    let url = path::target_url(&state.config.upstream.base_url, endpoint, parts.uri.query());

    let request_id = correlation::generate_id();
    let span = beview_tracing::proxy_request_span!(&request_id, &parts.method, endpoint);

    let result = async {
        tracing::info!(target_url = %url, "Proxying request");

        let body = if forward::carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, state.config.server.max_body_bytes)
                .await
                .map_err(ProxyError::failure)?;
            Some(bytes)
        } else {
            None
        };

        let forwarded = ForwardedRequest {
            method: parts.method.clone(),
            url,
            headers: headers::assemble(&parts.headers, &state.default_headers),
            body,
        };

        let upstream = forward::send(&state.client, forwarded, &request_id).await?;

        if let Some(auditor) = &state.auditor {
            auditor.dispatch(
                audit::bearer_credential(&parts.headers),
                endpoint.to_string(),
                upstream.status().as_u16(),
                request_id.clone(),
            );
        }

        relay::relay(upstream).await
    }
    .instrument(span.clone())
    .await;

    match &result {
        Ok(response) => {
            span.record("status", response.status().as_u16());
            span.record("outcome", "proxied");
        }
        Err(e) => {
            span.record("status", e.status().as_u16());
            span.record("outcome", "failed");
        }
    }
    result
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
