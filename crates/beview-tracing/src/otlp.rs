//! Subscriber assembly: env filter, stderr fmt layer, optional OTLP export.

use anyhow::Result;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::{LogFormat, OtlpProtocol, TracingConfig};

/// RAII guard that flushes and shuts down the tracer provider on drop.
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    /// Whether spans are being exported over OTLP.
    pub fn exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(ref mut provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown tracer provider: {e}");
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// Logs always go to stderr, as text or JSON depending on `config.format`.
/// When `otlp_endpoint` is set, spans are additionally exported over OTLP;
/// if the exporter cannot be built the service still starts with stderr
/// logging only and a warning is emitted.
///
/// Hold the returned [`TracingGuard`] for the lifetime of the process so
/// pending spans are flushed on shutdown.
pub fn init_tracing(config: &TracingConfig) -> TracingGuard {
    let (provider, otlp_error) = match config.otlp_endpoint() {
        Some(endpoint) => match build_provider(config, endpoint) {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let installed = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer(config.format, config.ansi))
        .with(otel_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Tracing subscriber already installed: {e}");
    }

    match (&provider, otlp_error) {
        (_, Some(e)) => tracing::warn!(
            error = %e,
            endpoint = ?config.otlp_endpoint(),
            "OTLP exporter failed to initialize, logging to stderr only"
        ),
        (Some(_), None) => tracing::info!(
            endpoint = ?config.otlp_endpoint(),
            service = %config.service_name,
            protocol = ?config.protocol,
            "OpenTelemetry OTLP tracing initialized"
        ),
        (None, None) => {}
    }

    TracingGuard { provider }
}

fn fmt_layer<S>(format: LogFormat, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Build a batching tracer provider for the configured collector.
fn build_provider(config: &TracingConfig, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = match config.protocol {
        OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?,
        OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?,
    };

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder_empty()
                .with_service_name(config.service_name.clone())
                .build(),
        )
        .build())
}
