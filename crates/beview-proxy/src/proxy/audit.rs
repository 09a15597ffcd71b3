//! Best-effort usage auditing.
//!
//! After each completed upstream round trip the caller's bearer credential
//! is resolved to an identity and a usage record is appended to the audit
//! store. The work runs on a detached task: failures are logged and never
//! reach the relayed response.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::error::AuditError;

/// One usage row: which endpoint, what upstream answered, who asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub endpoint: String,
    pub status: u16,
    pub user_id: String,
}

/// Resolves a bearer credential to a caller identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<String, AuditError>;
}

/// Append-only sink for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Extract the bearer credential from the inbound `authorization` header.
pub fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Runs identity resolution and the audit write for completed requests.
#[derive(Clone)]
pub struct Auditor {
    resolver: Arc<dyn IdentityResolver>,
    store: Arc<dyn AuditStore>,
}

impl Auditor {
    pub fn new(resolver: Arc<dyn IdentityResolver>, store: Arc<dyn AuditStore>) -> Self {
        Self { resolver, store }
    }

    /// Resolve the caller and persist one record.
    pub async fn record(
        &self,
        credential: &str,
        endpoint: String,
        status: u16,
    ) -> Result<AuditRecord, AuditError> {
        let user_id = self.resolver.resolve(credential).await?;
        tracing::Span::current().record("caller", user_id.as_str());

        let record = AuditRecord {
            endpoint,
            status,
            user_id,
        };
        self.store.insert(&record).await?;
        Ok(record)
    }

    /// Fire-and-forget: spawn the audit on its own task and return at once.
    ///
    /// The handle is only useful to callers that want to observe completion;
    /// the request path drops it.
    pub fn dispatch(
        &self,
        credential: Option<String>,
        endpoint: String,
        status: u16,
        request_id: String,
    ) -> JoinHandle<()> {
        let auditor = self.clone();

        tokio::spawn(async move {
            let span = beview_tracing::audit_span!(&request_id, &endpoint, status);

            async move {
                let Some(credential) = credential else {
                    tracing::debug!("No bearer credential, skipping audit");
                    return;
                };

                match auditor.record(&credential, endpoint, status).await {
                    Ok(record) => {
                        tracing::debug!(user_id = %record.user_id, "Audit record stored")
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to log API request"),
                }
            }
            .instrument(span)
            .await;
        })
    }
}
