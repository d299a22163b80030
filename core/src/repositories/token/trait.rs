//! Token store trait defining the interface for token persistence.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::token::{NewToken, TokenRecord};
use crate::errors::{DomainError, DomainResult};

/// Store trait for issued tokens
///
/// Implementations assign the public identifier and issue time on `create`,
/// reconstruct records on `find`, and toggle availability with
/// `disable`/`enable`. Records are never modified after creation.
///
/// # Security Considerations
/// - Identifiers passed to `find`, `disable` and `enable` are untrusted and
///   must be validated before they are used to locate storage
/// - The availability toggle must be atomic (rename or compare-and-swap)
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new token and return the stored record
    ///
    /// # Returns
    /// * `Ok(TokenRecord)` - The saved record with its fresh identifier
    /// * `Err(DomainError::Integrity)` - Identifier generation produced an
    ///   unusable or colliding identifier
    /// * `Err(DomainError::StoreIo)` - The write (or its audit entry) failed
    ///
    /// # Example
    /// ```no_run
    /// # use tg_core::repositories::TokenStore;
    /// # use tg_core::domain::entities::token::NewToken;
    /// # async fn example(store: &impl TokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = NewToken::new(42, "access").with_lifetime(3600);
    /// let record = store.create(token).await?;
    /// println!("Issued token {}", record.public_id());
    /// # Ok(())
    /// # }
    /// ```
    async fn create(&self, token: NewToken) -> DomainResult<TokenRecord>;

    /// Look up an enabled token
    ///
    /// # Returns
    /// * `Ok(Some(TokenRecord))` - Token found and enabled
    /// * `Ok(None)` - No enabled token with this identifier
    /// * `Err(DomainError::Token(BadToken))` - Unsafe identifier, or the stored
    ///   subtype differs from `subtype`
    /// * `Err(DomainError::StoreIo)` - Storage failure
    async fn find(&self, public_id: &str, subtype: &str) -> DomainResult<Option<TokenRecord>>;

    /// Look up an enabled token, treating absence as `BadToken`
    async fn read(&self, public_id: &str, subtype: &str) -> DomainResult<TokenRecord> {
        self.find(public_id, subtype)
            .await?
            .ok_or_else(|| DomainError::bad_token("token not found"))
    }

    /// Make a token unavailable without deleting it
    ///
    /// # Returns
    /// * `Ok(true)` - Token disabled
    /// * `Ok(false)` - No enabled token with this identifier
    async fn disable(&self, public_id: &str) -> DomainResult<bool>;

    /// Reverse `disable`
    ///
    /// # Returns
    /// * `Ok(true)` - Token enabled again
    /// * `Ok(false)` - No disabled token with this identifier
    async fn enable(&self, public_id: &str) -> DomainResult<bool>;

    /// Disable every token of a user
    ///
    /// Backends that cannot enumerate tokens by user keep this default and
    /// fail with `NotSupported`.
    async fn revoke_all_for_user(&self, _user_id: u64) -> DomainResult<usize> {
        Err(DomainError::NotSupported {
            operation: "revoke_all_for_user".to_string(),
        })
    }
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    async fn create(&self, token: NewToken) -> DomainResult<TokenRecord> {
        (**self).create(token).await
    }

    async fn find(&self, public_id: &str, subtype: &str) -> DomainResult<Option<TokenRecord>> {
        (**self).find(public_id, subtype).await
    }

    async fn read(&self, public_id: &str, subtype: &str) -> DomainResult<TokenRecord> {
        (**self).read(public_id, subtype).await
    }

    async fn disable(&self, public_id: &str) -> DomainResult<bool> {
        (**self).disable(public_id).await
    }

    async fn enable(&self, public_id: &str) -> DomainResult<bool> {
        (**self).enable(public_id).await
    }

    async fn revoke_all_for_user(&self, user_id: u64) -> DomainResult<usize> {
        (**self).revoke_all_for_user(user_id).await
    }
}

/// Rejects a record presented against a different subtype than it was issued for
pub fn ensure_subtype(record: TokenRecord, subtype: &str) -> DomainResult<TokenRecord> {
    if record.subtype() != subtype {
        return Err(DomainError::bad_token(format!(
            "token of subtype '{}' presented as '{}'",
            record.subtype(),
            subtype
        )));
    }
    Ok(record)
}
