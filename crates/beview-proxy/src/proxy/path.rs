//! Inbound path to upstream URL translation.

use super::error::ProxyError;

/// Return everything after the first `/<mount>/` in `path`.
pub fn endpoint_path<'a>(path: &'a str, mount: &str) -> Result<&'a str, ProxyError> {
    let marker = format!("/{mount}/");
    path.split_once(marker.as_str())
        .map(|(_, endpoint)| endpoint)
        .ok_or_else(|| ProxyError::bad_request(mount))
}

/// Build the upstream URL. The query string is appended untouched.
pub fn target_url(base_url: &str, endpoint: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{base_url}/{endpoint}?{q}"),
        _ => format!("{base_url}/{endpoint}"),
    }
}
