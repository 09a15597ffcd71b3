//! HTTP plumbing shared by the auth and content calls.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::types::ApiErrorBody;

/// Client for the BeReal API as exposed by a `beview-proxy` mount.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BeViewClient {
    http: reqwest::Client,
    base: Url,
}

impl BeViewClient {
    /// `proxy_url` is the proxy mount, e.g. `http://localhost:3080/bereal-proxy`.
    pub fn new(proxy_url: &str) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), proxy_url)
    }

    pub fn with_http_client(http: reqwest::Client, proxy_url: &str) -> Result<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: proxy_url.to_string(),
            reason,
        };

        let base = Url::parse(proxy_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }
        Ok(Self { http, base })
    }

    pub fn proxy_url(&self) -> &Url {
        &self.base
    }

    /// Build the URL for an endpoint below the mount. Segments are
    /// percent-encoded individually.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(segments))
            .header(CONTENT_TYPE, "application/json")
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Turn a non-success response into [`ClientError::Api`], preferring the
/// `message` field of the error payload over `fallback`.
pub(crate) async fn api_error(resp: Response, fallback: String) -> ClientError {
    let status = resp.status().as_u16();
    let message = match resp.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ApiErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(fallback),
        Err(_) => fallback,
    };
    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_below_mount() {
        let client = BeViewClient::new("http://localhost:3080/bereal-proxy").unwrap();
        assert_eq!(
            client.endpoint(&["person", "otp"]).as_str(),
            "http://localhost:3080/bereal-proxy/person/otp"
        );
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash_on_base() {
        let client = BeViewClient::new("http://localhost:3080/bereal-proxy/").unwrap();
        assert_eq!(
            client.endpoint(&["content", "friends"]).as_str(),
            "http://localhost:3080/bereal-proxy/content/friends"
        );
    }

    #[test]
    fn test_endpoint_encodes_segment() {
        let client = BeViewClient::new("http://localhost:3080/bereal-proxy").unwrap();
        assert_eq!(
            client.endpoint(&["content", "posts", "a/b c"]).as_str(),
            "http://localhost:3080/bereal-proxy/content/posts/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(matches!(
            BeViewClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            BeViewClient::new("mailto:someone@example.com"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }
}
