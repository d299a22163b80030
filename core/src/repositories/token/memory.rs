//! In-memory implementation of TokenStore
//!
//! Keeps records in a process-local map. The enable/disable toggle runs under
//! the write lock, which gives it compare-and-swap semantics. Used as a fake
//! in tests and for ephemeral deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::audit::{AuditAction, AuditEntry};
use crate::domain::entities::token::{NewToken, TokenRecord};
use crate::domain::value_objects::public_id::{IdentifierGenerator, PublicId};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::audit::{AuditSink, NoOpAuditSink};

use super::r#trait::{ensure_subtype, TokenStore};

struct StoredToken {
    record: TokenRecord,
    enabled: bool,
}

/// In-memory token store
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, StoredToken>>,
    generator: IdentifierGenerator,
    audit: Arc<dyn AuditSink>,
}

impl InMemoryTokenStore {
    /// Create an empty store with the default identifier digest and no audit log
    pub fn new() -> Self {
        Self::with_generator(IdentifierGenerator::default())
    }

    pub fn with_generator(generator: IdentifierGenerator) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            generator,
            audit: Arc::new(NoOpAuditSink),
        }
    }

    /// Attach an audit sink
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Number of stored tokens, enabled or not
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    async fn record_state_change(&self, action: AuditAction, public_id: &str) {
        if let Err(e) = self.audit.append(&AuditEntry::new(action, public_id)).await {
            tracing::warn!(
                public_id = public_id,
                action = action.as_str(),
                error = %e,
                "Failed to append audit entry"
            );
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn create(&self, token: NewToken) -> DomainResult<TokenRecord> {
        let public_id = self.generator.generate(&token)?.into_inner();
        let user_id = token.user_id;
        let record = TokenRecord::new(
            public_id.clone(),
            public_id.clone(),
            chrono::Utc::now().timestamp(),
            token,
        )?;

        {
            let mut tokens = self.tokens.write().await;
            if tokens.contains_key(&public_id) {
                return Err(DomainError::integrity("token identifier collision"));
            }
            tokens.insert(
                public_id.clone(),
                StoredToken {
                    record: record.clone(),
                    enabled: true,
                },
            );
        }

        let entry = AuditEntry::new(AuditAction::Create, &public_id).with_user(user_id);
        if let Err(e) = self.audit.append(&entry).await {
            // Issuance must not lose its audit trail.
            self.tokens.write().await.remove(&public_id);
            return Err(e);
        }

        Ok(record)
    }

    async fn find(&self, public_id: &str, subtype: &str) -> DomainResult<Option<TokenRecord>> {
        let id = PublicId::parse(public_id)?;
        let tokens = self.tokens.read().await;

        match tokens.get(id.as_str()) {
            Some(stored) if stored.enabled => ensure_subtype(stored.record.clone(), subtype).map(Some),
            _ => Ok(None),
        }
    }

    async fn disable(&self, public_id: &str) -> DomainResult<bool> {
        let id = PublicId::parse(public_id)?;
        let changed = {
            let mut tokens = self.tokens.write().await;
            match tokens.get_mut(id.as_str()) {
                Some(stored) if stored.enabled => {
                    stored.enabled = false;
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.record_state_change(AuditAction::Disable, id.as_str()).await;
        }
        Ok(changed)
    }

    async fn enable(&self, public_id: &str) -> DomainResult<bool> {
        let id = PublicId::parse(public_id)?;
        let changed = {
            let mut tokens = self.tokens.write().await;
            match tokens.get_mut(id.as_str()) {
                Some(stored) if !stored.enabled => {
                    stored.enabled = true;
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.record_state_change(AuditAction::Enable, id.as_str()).await;
        }
        Ok(changed)
    }

    async fn revoke_all_for_user(&self, user_id: u64) -> DomainResult<usize> {
        let revoked: Vec<String> = {
            let mut tokens = self.tokens.write().await;
            tokens
                .iter_mut()
                .filter(|(_, stored)| stored.record.user_id() == user_id && stored.enabled)
                .map(|(public_id, stored)| {
                    stored.enabled = false;
                    public_id.clone()
                })
                .collect()
        };

        for public_id in &revoked {
            self.record_state_change(AuditAction::Disable, public_id).await;
        }
        Ok(revoked.len())
    }
}
