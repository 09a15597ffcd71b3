//! Phone-number OTP login and token refresh.

use reqwest::Method;
use serde_json::json;

use crate::client::{api_error, decode, BeViewClient};
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::types::{AuthTokens, RefreshResponse};

impl BeViewClient {
    /// Ask the platform to text a one-time code to `phone_number`.
    pub async fn send_otp(&self, phone_number: &str) -> Result<()> {
        let resp = self
            .request(Method::POST, &["person", "otp"])
            .json(&json!({ "phoneNumber": phone_number }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error(resp, "Failed to send verification code".to_string()).await);
        }
        Ok(())
    }

    /// Exchange a one-time code for tokens and authenticate `session`.
    pub async fn verify_otp(&self, session: &mut Session, phone_number: &str, code: &str) -> Result<()> {
        let resp = self
            .request(Method::POST, &["person", "otp", "verify"])
            .json(&json!({ "phoneNumber": phone_number, "code": code }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error(resp, "Failed to verify code".to_string()).await);
        }

        let tokens: AuthTokens = decode(resp).await?;
        tracing::info!(user_id = %tokens.user_id, "Session authenticated");
        session.authenticate(tokens);
        Ok(())
    }

    /// Rotate the session's tokens. Any failure clears the session.
    pub async fn refresh_token(&self, session: &mut Session) -> Result<()> {
        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            return Err(ClientError::NotAuthenticated);
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(fresh) => session.refresh(fresh.token, fresh.refresh_token),
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, clearing session");
                session.clear();
                Err(err)
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let resp = self
            .request(Method::POST, &["person", "refresh-token"])
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(resp, format!("API error: {}", status.as_u16())).await);
        }
        decode(resp).await
    }

    /// Local only; the platform has no logout endpoint.
    pub fn logout(&self, session: &mut Session) {
        session.clear();
    }
}
