//! Token entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::value_objects::public_id::MIN_PUBLIC_ID_LEN;
use crate::errors::{DomainError, DomainResult};

/// Opaque extension payload carried by a token
pub type ExtensionData = Map<String, Value>;

/// Reserved extension keys. Caller data must not use the `__` prefix.
pub mod extension_keys {
    /// Prefix shared by every reserved key
    pub const RESERVED_PREFIX: &str = "__";

    /// Public key the client encrypts outbound payloads with (server pair)
    pub const CLIENT_ENCRYPT_KEY: &str = "__tunnel_client_encrypt_key";

    /// Private key the client decrypts inbound payloads with (user pair)
    pub const CLIENT_DECRYPT_KEY: &str = "__tunnel_client_decrypt_key";

    /// Public key the server encrypts outbound payloads with (user pair)
    pub const SERVER_ENCRYPT_KEY: &str = "__tunnel_server_encrypt_key";

    /// Private key the server decrypts inbound payloads with (server pair)
    pub const SERVER_DECRYPT_KEY: &str = "__tunnel_server_decrypt_key";

    /// All keys a tunnel token must carry
    pub const TUNNEL_KEYS: [&str; 4] = [
        CLIENT_ENCRYPT_KEY,
        CLIENT_DECRYPT_KEY,
        SERVER_ENCRYPT_KEY,
        SERVER_DECRYPT_KEY,
    ];

    pub fn is_reserved(key: &str) -> bool {
        key.starts_with(RESERVED_PREFIX)
    }
}

/// Everything a store needs to persist a new token.
///
/// The store adds the public identifier and the issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToken {
    pub user_id: u64,
    pub user_signature: Option<String>,
    pub client_address: Option<String>,
    pub client_hardware_id: Option<String>,
    pub lifetime_seconds: u64,
    pub permissions: BTreeSet<String>,
    pub extension_data: ExtensionData,
    pub subtype: String,
}

impl NewToken {
    /// Creates a non-expiring token request with no permissions
    pub fn new(user_id: u64, subtype: impl Into<String>) -> Self {
        Self {
            user_id,
            user_signature: None,
            client_address: None,
            client_hardware_id: None,
            lifetime_seconds: 0,
            permissions: BTreeSet::new(),
            extension_data: ExtensionData::new(),
            subtype: subtype.into(),
        }
    }

    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.user_signature = signature;
        self
    }

    pub fn with_client(mut self, address: Option<String>, hardware_id: Option<String>) -> Self {
        self.client_address = address;
        self.client_hardware_id = hardware_id;
        self
    }

    pub fn with_lifetime(mut self, lifetime_seconds: u64) -> Self {
        self.lifetime_seconds = lifetime_seconds;
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.permissions = normalize_permissions(permissions);
        self
    }

    pub fn with_extension_data(mut self, extension_data: ExtensionData) -> Self {
        self.extension_data = extension_data;
        self
    }
}

/// One issued token, reconstructed from the store on every resolve.
///
/// Fields are read-only after construction. Revocation changes availability
/// in the store, never the record.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    store_id: String,
    public_id: String,
    user_id: u64,
    user_signature: Option<String>,
    registration_client_address: Option<String>,
    registration_client_hardware_id: Option<String>,
    lifetime_seconds: u64,
    issued_at: i64,
    permissions: BTreeSet<String>,
    extension_data: ExtensionData,
    subtype: String,
}

impl TokenRecord {
    /// Builds a record from store-assigned fields and the token data.
    ///
    /// # Errors
    ///
    /// `Integrity` if `public_id` is shorter than 8 characters. A short id can
    /// only come from a broken generator or a corrupted store.
    pub fn new(
        store_id: impl Into<String>,
        public_id: impl Into<String>,
        issued_at: i64,
        token: NewToken,
    ) -> DomainResult<Self> {
        let public_id = public_id.into();
        if public_id.len() < MIN_PUBLIC_ID_LEN {
            return Err(DomainError::integrity(format!(
                "token identifier of {} characters is below the minimum of {}",
                public_id.len(),
                MIN_PUBLIC_ID_LEN
            )));
        }

        Ok(Self {
            store_id: store_id.into(),
            public_id,
            user_id: token.user_id,
            user_signature: token.user_signature,
            registration_client_address: token.client_address,
            registration_client_hardware_id: token.client_hardware_id,
            lifetime_seconds: token.lifetime_seconds,
            issued_at,
            permissions: normalize_permissions(token.permissions),
            extension_data: token.extension_data,
            subtype: token.subtype,
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn user_signature(&self) -> Option<&str> {
        self.user_signature.as_deref()
    }

    pub fn registration_client_address(&self) -> Option<&str> {
        self.registration_client_address.as_deref()
    }

    pub fn registration_client_hardware_id(&self) -> Option<&str> {
        self.registration_client_hardware_id.as_deref()
    }

    pub fn lifetime_seconds(&self) -> u64 {
        self.lifetime_seconds
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn extension_data(&self) -> &ExtensionData {
        &self.extension_data
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Looks up a single extension value
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extension_data.get(key)
    }

    /// Looks up a string extension value
    pub fn extension_str(&self, key: &str) -> Option<&str> {
        self.extension(key).and_then(Value::as_str)
    }

    /// Unix time at which the token expires, `None` for non-expiring tokens
    pub fn expires_at(&self) -> Option<i64> {
        if self.lifetime_seconds == 0 {
            return None;
        }
        let lifetime = i64::try_from(self.lifetime_seconds).unwrap_or(i64::MAX);
        Some(self.issued_at.saturating_add(lifetime))
    }

    /// Checks expiry against `now` (unix seconds). The expiry instant itself
    /// counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at() {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    /// Case-insensitive permission check
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(&permission.to_lowercase())
    }

    /// Rebuilds the token data, e.g. for persisting the record elsewhere
    pub fn to_new_token(&self) -> NewToken {
        NewToken {
            user_id: self.user_id,
            user_signature: self.user_signature.clone(),
            client_address: self.registration_client_address.clone(),
            client_hardware_id: self.registration_client_hardware_id.clone(),
            lifetime_seconds: self.lifetime_seconds,
            permissions: self.permissions.clone(),
            extension_data: self.extension_data.clone(),
            subtype: self.subtype.clone(),
        }
    }
}

// Extension data may hold private keys, so only the key names are printed.
impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("public_id", &self.public_id)
            .field("user_id", &self.user_id)
            .field("subtype", &self.subtype)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .field("issued_at", &self.issued_at)
            .field("permissions", &self.permissions)
            .field("extension_keys", &self.extension_data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Token representation returned to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientToken {
    /// Identifier the client presents on later requests
    pub access_identifier: String,

    /// Unix expiry time, or 0 for tokens that never expire
    pub expires_at_or_zero: i64,

    /// Client encrypt key (hex), tunnel tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Client decrypt key (hex), tunnel tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl ClientToken {
    /// Builds the client view of a record. Server-held keys are never included.
    pub fn from_record(record: &TokenRecord) -> Self {
        Self {
            access_identifier: record.public_id().to_string(),
            expires_at_or_zero: record.expires_at().unwrap_or(0),
            public_key: record
                .extension_str(extension_keys::CLIENT_ENCRYPT_KEY)
                .map(str::to_string),
            private_key: record
                .extension_str(extension_keys::CLIENT_DECRYPT_KEY)
                .map(str::to_string),
        }
    }

    pub fn is_tunnel(&self) -> bool {
        self.public_key.is_some() && self.private_key.is_some()
    }
}

/// Lower-cases and de-duplicates permission labels
pub fn normalize_permissions<I, S>(permissions: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    permissions
        .into_iter()
        .map(|permission| permission.as_ref().trim().to_lowercase())
        .filter(|permission| !permission.is_empty())
        .collect()
}
