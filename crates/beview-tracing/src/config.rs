//! Logging and span export settings, read from the `[tracing]` section.

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Reported as `service.name` on exported spans.
    pub service_name: String,

    /// Collector URL, e.g. `http://collector:4317`. Export is off when unset
    /// or empty.
    pub otlp_endpoint: Option<String>,

    pub protocol: OtlpProtocol,

    /// `EnvFilter` directives, e.g. `beview_proxy=debug,info`.
    pub log_level: String,

    pub format: LogFormat,

    /// Colourise text output. Ignored for JSON.
    pub ansi: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "beview-proxy".to_string(),
            otlp_endpoint: None,
            protocol: OtlpProtocol::Grpc,
            log_level: "info".to_string(),
            format: LogFormat::Text,
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// The collector endpoint, if export is enabled.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Filter from `log_level`; unparseable directives fall back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
