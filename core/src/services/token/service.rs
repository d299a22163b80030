//! Main token service implementation

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::token::{
    extension_keys, normalize_permissions, ClientToken, NewToken, TokenRecord,
};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenStore;
use crate::services::crypto::{KeyPairService, TunnelCodec};
use crate::services::permission::{PermissionResolver, SubtypeRegistry};

use super::clock::{Clock, SystemClock};
use super::config::TokenServiceConfig;
use super::tunnel::{attach_tunnel_keys, verify_tunnel_keys};

/// Service for issuing, resolving and revoking tokens
pub struct TokenService<S: TokenStore> {
    pub(crate) store: S,
    resolver: PermissionResolver,
    keys: KeyPairService,
    codec: TunnelCodec,
    clock: Arc<dyn Clock>,
}

impl<S: TokenStore> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Token store for persistence
    /// * `registry` - Known token subtypes
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or a configuration error if the key size is too small
    pub fn new(
        store: S,
        registry: Arc<SubtypeRegistry>,
        config: TokenServiceConfig,
    ) -> DomainResult<Self> {
        Ok(Self {
            store,
            resolver: PermissionResolver::new(registry),
            keys: KeyPairService::new(config.key_bits)?,
            codec: TunnelCodec::new(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the time source used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Codec for payloads exchanged under tunnel tokens
    pub fn codec(&self) -> &TunnelCodec {
        &self.codec
    }

    /// Issues a new token
    ///
    /// # Arguments
    ///
    /// * `user_id` - Owner of the token
    /// * `signature` - Hash of the credentials that produced the token
    /// * `lifetime_seconds` - Lifetime, 0 for a token that never expires
    /// * `subtype` - Registered subtype name
    /// * `client_address`, `client_hardware_id` - Client binding metadata
    ///
    /// # Returns
    ///
    /// * `Ok(TokenRecord)` - The stored record
    /// * `Err(DomainError::Configuration)` - Unknown or broken subtype
    /// * `Err(DomainError::StoreIo)` - Persistence failed
    pub async fn issue(
        &self,
        user_id: u64,
        signature: Option<String>,
        lifetime_seconds: u64,
        subtype: &str,
        client_address: Option<String>,
        client_hardware_id: Option<String>,
    ) -> DomainResult<TokenRecord> {
        let token = NewToken::new(user_id, subtype)
            .with_signature(signature)
            .with_lifetime(lifetime_seconds)
            .with_client(client_address, client_hardware_id);
        self.issue_token(token).await
    }

    /// Issues a token from a prepared request
    ///
    /// Permissions are always taken from the subtype. Extension data supplied by
    /// the caller is kept, but reserved (`__`-prefixed) keys are rejected.
    pub async fn issue_token(&self, mut token: NewToken) -> DomainResult<TokenRecord> {
        if let Some(key) = token
            .extension_data
            .keys()
            .find(|key| extension_keys::is_reserved(key))
        {
            return Err(DomainError::bad_token(format!(
                "extension key '{}' is reserved",
                key
            )));
        }

        token.permissions = self.resolver.effective_permissions(&token.subtype)?;
        let tunnel = self.resolver.is_tunnel(&token.subtype)?;

        if tunnel {
            attach_tunnel_keys(self.keys, &mut token.extension_data).await?;
        }

        let record = self.store.create(token).await?;

        if tunnel {
            if let Err(e) = verify_tunnel_keys(&record) {
                self.withdraw(&record).await;
                return Err(e);
            }
        }

        tracing::info!(
            event = "token_issued",
            public_id = %record.public_id(),
            user_id = record.user_id(),
            subtype = %record.subtype(),
            lifetime_seconds = record.lifetime_seconds(),
            tunnel = tunnel,
            "Token issued"
        );

        Ok(record)
    }

    /// Disables a record that failed its post-create check
    async fn withdraw(&self, record: &TokenRecord) {
        match self.store.disable(record.public_id()).await {
            Ok(_) => tracing::warn!(
                event = "token_withdrawn",
                public_id = %record.public_id(),
                user_id = record.user_id()
            ),
            Err(e) => tracing::error!(
                event = "token_withdraw_failed",
                public_id = %record.public_id(),
                error = %e
            ),
        }
    }

    /// Resolves a presented identifier into its record
    ///
    /// # Returns
    ///
    /// * `Ok(TokenRecord)` - Token exists, is enabled and has not expired
    /// * `Err(TokenError::BadToken)` - Unknown, disabled, unsafe or wrong-subtype identifier
    /// * `Err(TokenError::ExpiredToken)` - Lifetime elapsed
    pub async fn resolve(&self, public_id: &str, subtype: &str) -> DomainResult<TokenRecord> {
        let record = match self.store.read(public_id, subtype).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(event = "token_rejected", error_code = e.error_code(), error = %e);
                return Err(e);
            }
        };

        if record.is_expired_at(self.clock.now()) {
            tracing::debug!(
                event = "token_expired",
                public_id = %record.public_id(),
                user_id = record.user_id()
            );
            return Err(TokenError::ExpiredToken.into());
        }

        Ok(record)
    }

    /// Case-insensitive subset check
    ///
    /// An empty `required` list falls back to the subtype's own declared
    /// permissions.
    pub fn check_permissions(&self, record: &TokenRecord, required: &[&str]) -> DomainResult<bool> {
        let required: BTreeSet<String> = if required.is_empty() {
            self.resolver.declared_permissions(record.subtype())?
        } else {
            normalize_permissions(required)
        };

        Ok(required.is_subset(record.permissions()))
    }

    /// Like [`check_permissions`](Self::check_permissions) but fails with `NoAccess`
    pub fn require_permissions(&self, record: &TokenRecord, required: &[&str]) -> DomainResult<()> {
        if self.check_permissions(record, required)? {
            return Ok(());
        }

        tracing::warn!(
            event = "permission_denied",
            public_id = %record.public_id(),
            user_id = record.user_id(),
            required = ?required
        );
        Err(DomainError::no_access(format!(
            "token {} lacks required permissions",
            record.public_id()
        )))
    }

    /// Disables a token
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Token disabled
    /// * `Err(TokenError::NoAccess)` - No enabled token with this identifier
    /// * `Err(TokenError::BadToken)` - Unsafe identifier
    pub async fn revoke(&self, public_id: &str) -> DomainResult<()> {
        if !self.store.disable(public_id).await? {
            return Err(DomainError::no_access(format!("token {} cannot be revoked", public_id)));
        }

        tracing::info!(event = "token_revoked", public_id = public_id, "Token revoked");
        Ok(())
    }

    /// Re-enables a revoked token
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Token enabled again
    /// * `Err(TokenError::NoAccess)` - No disabled token with this identifier
    pub async fn restore(&self, public_id: &str) -> DomainResult<()> {
        if !self.store.enable(public_id).await? {
            return Err(DomainError::no_access(format!("token {} cannot be restored", public_id)));
        }

        tracing::info!(event = "token_restored", public_id = public_id, "Token restored");
        Ok(())
    }

    /// Revokes every token of a user, returning how many were disabled
    ///
    /// Fails with `NotSupported` on stores that cannot enumerate by user.
    pub async fn revoke_all_for_user(&self, user_id: u64) -> DomainResult<usize> {
        let count = self.store.revoke_all_for_user(user_id).await?;
        tracing::info!(event = "user_tokens_revoked", user_id = user_id, count = count);
        Ok(count)
    }

    /// Client-facing view of a record
    pub fn client_token(&self, record: &TokenRecord) -> ClientToken {
        ClientToken::from_record(record)
    }

    /// Rejects tokens minted for credentials that have since changed
    pub fn verify_signature(&self, record: &TokenRecord, current_signature: &str) -> DomainResult<()> {
        match record.user_signature() {
            Some(signature) if signature != current_signature => {
                tracing::warn!(
                    event = "signature_mismatch",
                    public_id = %record.public_id(),
                    user_id = record.user_id()
                );
                Err(DomainError::bad_token("credential signature changed"))
            }
            _ => Ok(()),
        }
    }
}
