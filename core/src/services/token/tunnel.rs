//! Tunnel token creation hooks

use crate::domain::entities::token::{extension_keys, ExtensionData, TokenRecord};
use crate::errors::{DomainError, DomainResult};
use crate::services::crypto::{KeyPairService, PrivateKey, PublicKey};

/// Generates the user and server key pairs and stores them by role
///
/// Runs key generation on the blocking pool.
pub(super) async fn attach_tunnel_keys(
    keys: KeyPairService,
    extension_data: &mut ExtensionData,
) -> DomainResult<()> {
    let (user, server) = tokio::task::spawn_blocking(move || {
        Ok::<_, DomainError>((keys.generate()?, keys.generate()?))
    })
    .await
    .map_err(|e| DomainError::Internal {
        message: format!("Key generation task failed: {}", e),
    })??;

    let entries = [
        (extension_keys::CLIENT_ENCRYPT_KEY, server.public.to_hex()?),
        (extension_keys::CLIENT_DECRYPT_KEY, user.private.to_hex()?),
        (extension_keys::SERVER_ENCRYPT_KEY, user.public.to_hex()?),
        (extension_keys::SERVER_DECRYPT_KEY, server.private.to_hex()?),
    ];
    for (name, value) in entries {
        extension_data.insert(name.to_string(), value.into());
    }

    Ok(())
}

/// Checks that a stored tunnel token carries all four keys in decodable form
pub(super) fn verify_tunnel_keys(record: &TokenRecord) -> DomainResult<()> {
    for name in extension_keys::TUNNEL_KEYS {
        let hex = match record.extension_str(name) {
            Some(hex) if !hex.is_empty() => hex,
            _ => {
                return Err(DomainError::bad_token(format!(
                    "tunnel token {} is missing {}",
                    record.public_id(),
                    name
                )))
            }
        };

        let decoded = if name == extension_keys::CLIENT_DECRYPT_KEY
            || name == extension_keys::SERVER_DECRYPT_KEY
        {
            PrivateKey::from_hex(hex).map(drop)
        } else {
            PublicKey::from_hex(hex).map(drop)
        };
        decoded.map_err(|_| {
            DomainError::bad_token(format!(
                "tunnel token {} carries an unreadable {}",
                record.public_id(),
                name
            ))
        })?;
    }
    Ok(())
}
