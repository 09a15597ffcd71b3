//! Configuration types and loading logic.

use beview_tracing::TracingConfig;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Top-level proxy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub platform_headers: PlatformHeaders,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Largest inbound body buffered for forwarding.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Upstream platform API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Route segment marking where the forwarded endpoint path begins.
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Whole-request timeout. Unset leaves the HTTP client's default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Platform identification headers added when the caller omits them.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformHeaders {
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_device_id")]
    pub device_id: String,
    #[serde(default = "default_device_language")]
    pub device_language: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Usage audit backend (Supabase auth + PostgREST).
///
/// Auditing is active only when both `supabase_url` and
/// `supabase_anon_key` are set.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,

    #[serde(default)]
    pub supabase_anon_key: Option<String>,

    #[serde(default = "default_audit_table")]
    pub table: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:3080".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_upstream_base_url() -> String {
    "https://mobile.bereal.com/api".to_string()
}

fn default_mount() -> String {
    "bereal-proxy".to_string()
}

fn default_app_version() -> String {
    "0.30.0".to_string()
}

fn default_device_id() -> String {
    "ios".to_string()
}

fn default_device_language() -> String {
    "en-US".to_string()
}

fn default_user_agent() -> String {
    "BeReal/8309 CFNetwork/1399 Darwin/22.1.0".to_string()
}

fn default_audit_table() -> String {
    "api_requests".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            mount: default_mount(),
            timeout_secs: None,
        }
    }
}

impl Default for PlatformHeaders {
    fn default() -> Self {
        Self {
            app_version: default_app_version(),
            device_id: default_device_id(),
            device_language: default_device_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            table: default_audit_table(),
        }
    }
}

impl AuditConfig {
    /// Supabase URL and anon key, when both are configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.supabase_url.as_deref().filter(|s| !s.is_empty())?;
        let key = self.supabase_anon_key.as_deref().filter(|s| !s.is_empty())?;
        Some((url, key))
    }
}

impl ProxyConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. `BEVIEW_SUPABASE_URL` / `BEVIEW_SUPABASE_ANON_KEY`
    /// 2. Environment variables (BEVIEW_ prefix, __ for nesting)
    /// 3. TOML config file (may be absent)
    /// 4. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let mut config = Self::from_figment(
            Figment::new()
                .merge(Toml::file(config_path))
                .merge(Env::prefixed("BEVIEW_").split("__")),
        )?;

        // Direct env var overrides for the audit secrets
        if let Ok(url) = std::env::var("BEVIEW_SUPABASE_URL") {
            config.audit.supabase_url = Some(url);
        }
        if let Ok(key) = std::env::var("BEVIEW_SUPABASE_ANON_KEY") {
            config.audit.supabase_anon_key = Some(key);
        }

        Ok(config)
    }

    /// Extract configuration from an already assembled figment.
    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let mut config: ProxyConfig = figment.extract()?;
        config.upstream.base_url = config.upstream.base_url.trim_end_matches('/').to_string();
        config.upstream.mount = config.upstream.mount.trim_matches('/').to_string();
        if config.upstream.mount.is_empty() {
            anyhow::bail!("upstream.mount must name a path segment");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProxyConfig::from_figment(Figment::new()).unwrap();
        assert_eq!(config.server.listen_address, "0.0.0.0:3080");
        assert_eq!(config.upstream.base_url, "https://mobile.bereal.com/api");
        assert_eq!(config.upstream.mount, "bereal-proxy");
        assert!(config.upstream.timeout_secs.is_none());
        assert_eq!(config.platform_headers.app_version, "0.30.0");
        assert_eq!(config.platform_headers.device_id, "ios");
        assert_eq!(config.platform_headers.device_language, "en-US");
        assert_eq!(
            config.platform_headers.user_agent,
            "BeReal/8309 CFNetwork/1399 Darwin/22.1.0"
        );
        assert_eq!(config.audit.table, "api_requests");
        assert!(config.audit.credentials().is_none());
    }

    #[test]
    fn test_toml_overrides_and_normalization() {
        let toml = r#"
            [upstream]
            base_url = "http://localhost:9000/api/"
            mount = "/proxy/"
            timeout_secs = 30

            [platform_headers]
            device_id = "android"

            [audit]
            supabase_url = "https://project.supabase.co"
            supabase_anon_key = "anon"
        "#;
        let config = ProxyConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();

        assert_eq!(config.upstream.base_url, "http://localhost:9000/api");
        assert_eq!(config.upstream.mount, "proxy");
        assert_eq!(config.upstream.timeout_secs, Some(30));
        assert_eq!(config.platform_headers.device_id, "android");
        assert_eq!(config.platform_headers.app_version, "0.30.0");
        assert_eq!(
            config.audit.credentials(),
            Some(("https://project.supabase.co", "anon"))
        );
    }

    #[test]
    fn test_blank_audit_key_disables_audit() {
        let toml = r#"
            [audit]
            supabase_url = "https://project.supabase.co"
            supabase_anon_key = ""
        "#;
        let config = ProxyConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();
        assert!(config.audit.credentials().is_none());
    }

    #[test]
    fn test_empty_mount_rejected() {
        let toml = r#"
            [upstream]
            mount = "/"
        "#;
        assert!(ProxyConfig::from_figment(Figment::new().merge(Toml::string(toml))).is_err());
    }
}
