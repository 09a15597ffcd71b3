//! beview-proxy: CORS forwarding proxy in front of the BeReal mobile API.
//!
//! Browsers call `/<mount>/<endpoint>` on this service; the request is
//! replayed against the platform API with its identification headers filled
//! in, and the answer comes back with permissive CORS headers.

mod config;
mod proxy;
mod server;

use std::sync::Arc;
use std::time::Duration;

use config::ProxyConfig;
use proxy::audit::Auditor;
use proxy::supabase::{SupabaseAuditStore, SupabaseIdentityResolver};
use server::AppState;

fn main() -> anyhow::Result<()> {
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("BEVIEW_PROXY_CONFIG").ok())
            .unwrap_or_else(|| "beview-proxy.toml".to_string())
    };

    let config = ProxyConfig::load(&config_path)?;

    // The tonic OTLP exporter needs a reactor, so build the runtime first
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let _tracing_guard = beview_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            upstream_base = %config.upstream.base_url,
            mount = %config.upstream.mount,
            "Starting beview-proxy"
        );

        run(config).await
    })
}

async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let mut upstream_builder = reqwest::Client::builder();
    if let Some(secs) = config.upstream.timeout_secs {
        upstream_builder = upstream_builder.timeout(Duration::from_secs(secs));
    }
    let upstream_client = upstream_builder.build()?;

    let auditor = build_auditor(&config)?;
    let state = AppState::new(config, upstream_client, auditor)?;

    server::run(state).await
}

/// Wire the Supabase collaborators when audit credentials are configured.
fn build_auditor(config: &ProxyConfig) -> anyhow::Result<Option<Auditor>> {
    let Some((url, anon_key)) = config.audit.credentials() else {
        tracing::info!("Supabase credentials not configured, request auditing disabled");
        return Ok(None);
    };

    let audit_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let resolver = SupabaseIdentityResolver::new(audit_client.clone(), url, anon_key);
    let store = SupabaseAuditStore::new(audit_client, url, anon_key, &config.audit.table);

    tracing::info!(supabase_url = %url, table = %config.audit.table, "Request auditing enabled");
    Ok(Some(Auditor::new(Arc::new(resolver), Arc::new(store))))
}
