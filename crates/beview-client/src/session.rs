//! Caller-owned authentication session.
//!
//! Lifecycle: `Uninitialized -> Authenticated -> (refresh)* -> Cleared`.
//! A cleared session can be authenticated again.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::AuthTokens;

/// Tokens and identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

/// Observable lifecycle stage of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Authenticated,
    Cleared,
}

#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Uninitialized,
    Authenticated(Credentials),
    Cleared,
}

/// Authentication state passed by reference into API calls.
#[derive(Debug, Clone, Default)]
pub struct Session {
    stage: Stage,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from previously stored credentials.
    pub fn restore(credentials: Credentials) -> Self {
        Self {
            stage: Stage::Authenticated(credentials),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Uninitialized => SessionState::Uninitialized,
            Stage::Authenticated(_) => SessionState::Authenticated,
            Stage::Cleared => SessionState::Cleared,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.stage, Stage::Authenticated(_))
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.stage {
            Stage::Authenticated(credentials) => Some(credentials),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credentials().map(|c| c.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials().map(|c| c.refresh_token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.credentials().map(|c| c.user_id.as_str())
    }

    /// Enter the authenticated stage after a successful verification.
    pub fn authenticate(&mut self, tokens: AuthTokens) {
        self.stage = Stage::Authenticated(Credentials {
            access_token: tokens.token,
            refresh_token: tokens.refresh_token,
            user_id: tokens.user_id,
        });
    }

    /// Replace the tokens of an authenticated session; the user id is kept.
    pub fn refresh(&mut self, access_token: String, refresh_token: String) -> Result<()> {
        match &mut self.stage {
            Stage::Authenticated(credentials) => {
                credentials.access_token = access_token;
                credentials.refresh_token = refresh_token;
                Ok(())
            }
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    /// Drop all credentials.
    pub fn clear(&mut self) {
        self.stage = Stage::Cleared;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> AuthTokens {
        AuthTokens {
            token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            user_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_uninitialized() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut session = Session::new();

        session.authenticate(tokens());
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.access_token(), Some("access-1"));
        assert_eq!(session.user_id(), Some("user-1"));

        session
            .refresh("access-2".to_string(), "refresh-2".to_string())
            .unwrap();
        assert_eq!(session.access_token(), Some("access-2"));
        assert_eq!(session.refresh_token(), Some("refresh-2"));
        assert_eq!(session.user_id(), Some("user-1"));

        session.clear();
        assert_eq!(session.state(), SessionState::Cleared);
        assert_eq!(session.credentials(), None);
    }

    #[test]
    fn test_refresh_requires_authentication() {
        let mut session = Session::new();
        let err = session
            .refresh("a".to_string(), "r".to_string())
            .unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));

        session.clear();
        assert!(session.refresh("a".to_string(), "r".to_string()).is_err());
    }

    #[test]
    fn test_restore_round_trips_credentials() {
        let credentials = Credentials {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            user_id: "u".to_string(),
        };
        let session = Session::restore(credentials.clone());
        assert_eq!(session.credentials(), Some(&credentials));
    }
}
