//! Supabase-backed identity resolution and audit storage.

use async_trait::async_trait;
use serde::Deserialize;

use super::audit::{AuditRecord, AuditStore, IdentityResolver};
use super::error::AuditError;

/// Subset of the Supabase `GET /auth/v1/user` response.
#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
}

/// Looks callers up through Supabase Auth.
#[derive(Clone)]
pub struct SupabaseIdentityResolver {
    client: reqwest::Client,
    url: String,
    anon_key: String,
}

impl SupabaseIdentityResolver {
    pub fn new(client: reqwest::Client, supabase_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            url: format!("{}/auth/v1/user", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityResolver for SupabaseIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<String, AuditError> {
        let resp = self
            .client
            .get(&self.url)
            .header("apikey", &self.anon_key)
            .bearer_auth(credential)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuditError::Identity(format!("{status}: {body}")));
        }

        let user: SupabaseUser = resp.json().await?;
        Ok(user.id)
    }
}

/// Inserts audit rows through the Supabase REST (PostgREST) API.
#[derive(Clone)]
pub struct SupabaseAuditStore {
    client: reqwest::Client,
    url: String,
    anon_key: String,
}

impl SupabaseAuditStore {
    pub fn new(client: reqwest::Client, supabase_url: &str, anon_key: &str, table: &str) -> Self {
        Self {
            client,
            url: format!("{}/rest/v1/{table}", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl AuditStore for SupabaseAuditStore {
    async fn insert(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let resp = self
            .client
            .post(&self.url)
            .header("apikey", &self.anon_key)
            .header("prefer", "return=minimal")
            .bearer_auth(&self.anon_key)
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuditError::Store(format!("{status}: {body}")));
        }
        Ok(())
    }
}
