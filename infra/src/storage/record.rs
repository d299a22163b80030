//! On-disk token document
//!
//! One JSON object per file. `permissions` and `extensionData` are stored as
//! nested JSON strings so that each can be decoded independently. Unknown
//! outer fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tg_core::domain::entities::token::{ExtensionData, NewToken, TokenRecord};
use tg_core::errors::{DomainError, DomainResult};

/// Serialized form of a token record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    pub user_id: u64,

    #[serde(default)]
    pub user_signature: Option<String>,

    /// Client address at registration
    #[serde(default)]
    pub user_ip: Option<String>,

    /// Client hardware id at registration
    #[serde(default)]
    pub user_mac: Option<String>,

    #[serde(default)]
    pub lifetime_seconds: u64,

    pub issued_at: i64,

    /// Absent in documents written before subtypes were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// JSON array of permission labels
    pub permissions: String,

    /// JSON object of extension values
    #[serde(default = "empty_object")]
    pub extension_data: String,
}

impl StoredToken {
    pub fn from_new_token(token: &NewToken, issued_at: i64) -> DomainResult<Self> {
        Ok(Self {
            user_id: token.user_id,
            user_signature: token.user_signature.clone(),
            user_ip: token.client_address.clone(),
            user_mac: token.client_hardware_id.clone(),
            lifetime_seconds: token.lifetime_seconds,
            issued_at,
            subtype: Some(token.subtype.clone()),
            permissions: serde_json::to_string(&token.permissions).map_err(encode_error)?,
            extension_data: serde_json::to_string(&token.extension_data).map_err(encode_error)?,
        })
    }

    /// Rebuilds the record stored under `public_id`
    ///
    /// Documents without a subtype are taken to belong to `requested_subtype`.
    pub fn into_record(self, public_id: &str, requested_subtype: &str) -> DomainResult<TokenRecord> {
        let permissions: BTreeSet<String> = serde_json::from_str(&self.permissions)
            .map_err(|e| corrupt(public_id, "permissions", e))?;
        let extension_data: ExtensionData = serde_json::from_str(&self.extension_data)
            .map_err(|e| corrupt(public_id, "extensionData", e))?;

        let token = NewToken::new(self.user_id, self.subtype.unwrap_or_else(|| requested_subtype.to_string()))
            .with_signature(self.user_signature)
            .with_client(self.user_ip, self.user_mac)
            .with_lifetime(self.lifetime_seconds)
            .with_permissions(permissions)
            .with_extension_data(extension_data);

        TokenRecord::new(public_id, public_id, self.issued_at, token)
    }

    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(encode_error)
    }

    pub fn from_bytes(public_id: &str, bytes: &[u8]) -> DomainResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| corrupt(public_id, "document", e))
    }
}

fn empty_object() -> String {
    String::from("{}")
}

fn encode_error(err: serde_json::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to encode token document: {}", err),
    }
}

fn corrupt(public_id: &str, field: &str, err: serde_json::Error) -> DomainError {
    DomainError::integrity(format!("token {} has a corrupt {}: {}", public_id, field, err))
}
