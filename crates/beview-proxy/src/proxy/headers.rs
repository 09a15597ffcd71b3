//! Outbound header assembly.
//!
//! The forwarded set is the inbound set minus `host`, plus the platform
//! identification headers the upstream API expects. Caller-supplied values
//! always win over the defaults.

use anyhow::Context;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::PlatformHeaders;

pub const APP_VERSION: &str = "bereal-app-version";
pub const DEVICE_ID: &str = "bereal-device-id";
pub const DEVICE_LANGUAGE: &str = "bereal-device-language";

/// Validated platform header defaults, built once at startup.
#[derive(Debug, Clone)]
pub struct DefaultHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl DefaultHeaders {
    pub fn from_config(config: &PlatformHeaders) -> anyhow::Result<Self> {
        let pairs = [
            (HeaderName::from_static(APP_VERSION), &config.app_version),
            (HeaderName::from_static(DEVICE_ID), &config.device_id),
            (HeaderName::from_static(DEVICE_LANGUAGE), &config.device_language),
            (header::USER_AGENT, &config.user_agent),
        ];

        let entries = pairs
            .into_iter()
            .map(|(name, value)| {
                HeaderValue::from_str(value)
                    .with_context(|| format!("invalid default for header {name}"))
                    .map(|value| (name, value))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { entries })
    }
}

/// Build the forwarded header set from the inbound headers.
pub fn assemble(inbound: &HeaderMap, defaults: &DefaultHeaders) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);

    for (name, value) in &defaults.entries {
        if !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> DefaultHeaders {
        DefaultHeaders::from_config(&PlatformHeaders::default()).unwrap()
    }

    #[test]
    fn test_host_is_dropped() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            HeaderName::from_bytes(b"Host").unwrap(),
            HeaderValue::from_static("localhost:3080"),
        );
        inbound.insert("accept", HeaderValue::from_static("application/json"));

        let headers = assemble(&inbound, &defaults());

        assert!(!headers.contains_key(header::HOST));
        assert_eq!(headers[header::ACCEPT], "application/json");
    }

    #[test]
    fn test_defaults_fill_missing_platform_headers() {
        let headers = assemble(&HeaderMap::new(), &defaults());

        assert_eq!(headers[APP_VERSION], "0.30.0");
        assert_eq!(headers[DEVICE_ID], "ios");
        assert_eq!(headers[DEVICE_LANGUAGE], "en-US");
        assert_eq!(
            headers[header::USER_AGENT],
            "BeReal/8309 CFNetwork/1399 Darwin/22.1.0"
        );
    }

    #[test]
    fn test_caller_values_take_precedence() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            HeaderName::from_bytes(b"BeReal-Device-Id").unwrap(),
            HeaderValue::from_static("android"),
        );
        inbound.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let headers = assemble(&inbound, &defaults());

        assert_eq!(headers.get_all(DEVICE_ID).iter().count(), 1);
        assert_eq!(headers[DEVICE_ID], "android");
        assert_eq!(headers[header::USER_AGENT], "curl/8.0");
        assert_eq!(headers[APP_VERSION], "0.30.0");
        assert_eq!(headers[DEVICE_LANGUAGE], "en-US");
    }

    #[test]
    fn test_other_headers_pass_through() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc"),
        );
        inbound.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        inbound.append("x-multi", HeaderValue::from_static("one"));
        inbound.append("x-multi", HeaderValue::from_static("two"));

        let headers = assemble(&inbound, &defaults());

        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let multi: Vec<_> = headers.get_all("x-multi").iter().collect();
        assert_eq!(multi, vec!["one", "two"]);
    }

    #[test]
    fn test_invalid_default_rejected() {
        let config = PlatformHeaders {
            device_id: "bad\nvalue".to_string(),
            ..PlatformHeaders::default()
        };
        assert!(DefaultHeaders::from_config(&config).is_err());
    }
}
