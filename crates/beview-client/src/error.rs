//! Error types for beview-client.

use thiserror::Error;

/// Errors returned by [`BeViewClient`](crate::BeViewClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call needs an authenticated session and there is none.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The access token was rejected and could not be refreshed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The configured proxy URL cannot be used as a base.
    #[error("invalid proxy URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
