//! Tunnel payload codec
//!
//! Envelope layout:
//!
//! ```text
//! u16 BE wrapped-key length | RSA-wrapped session key | 12-byte nonce | AES-256-GCM ciphertext
//! ```
//!
//! A fresh 256-bit session key is generated per payload and wrapped with the
//! recipient's RSA public key. Every failure surfaces as `BadToken`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::domain::entities::token::{extension_keys, TokenRecord};
use crate::errors::{DomainError, DomainResult};

use super::key_pair::{KeyPairService, PrivateKey, PublicKey};

/// AES-256 session key length in bytes
pub const SESSION_KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes
pub const ENVELOPE_NONCE_LEN: usize = 12;

const LENGTH_PREFIX_LEN: usize = 2;
const AEAD_TAG_LEN: usize = 16;

/// Which side of the tunnel produced the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelDirection {
    /// Sealed with the client encrypt key, opened with the server decrypt key
    ClientToServer,
    /// Sealed with the server encrypt key, opened with the client decrypt key
    ServerToClient,
}

impl TunnelDirection {
    fn encrypt_key(&self) -> &'static str {
        match self {
            TunnelDirection::ClientToServer => extension_keys::CLIENT_ENCRYPT_KEY,
            TunnelDirection::ServerToClient => extension_keys::SERVER_ENCRYPT_KEY,
        }
    }

    fn decrypt_key(&self) -> &'static str {
        match self {
            TunnelDirection::ClientToServer => extension_keys::SERVER_DECRYPT_KEY,
            TunnelDirection::ServerToClient => extension_keys::CLIENT_DECRYPT_KEY,
        }
    }
}

/// Encrypts and decrypts payloads with a tunnel token's key material
#[derive(Debug, Clone, Copy, Default)]
pub struct TunnelCodec;

impl TunnelCodec {
    pub fn new() -> Self {
        Self
    }

    /// Seal `plaintext` with the key the record holds for `direction`
    pub fn encrypt(
        &self,
        record: &TokenRecord,
        direction: TunnelDirection,
        plaintext: &[u8],
    ) -> DomainResult<Vec<u8>> {
        let key = PublicKey::from_hex(tunnel_key(record, direction.encrypt_key())?)?;
        self.seal_with(&key, plaintext)
    }

    /// Open an envelope with the key the record holds for `direction`
    pub fn decrypt(
        &self,
        record: &TokenRecord,
        direction: TunnelDirection,
        envelope: &[u8],
    ) -> DomainResult<Vec<u8>> {
        let key = PrivateKey::from_hex(tunnel_key(record, direction.decrypt_key())?)?;
        self.open_with(&key, envelope)
    }

    /// [`encrypt`](Self::encrypt) with a base64 result for text transports
    pub fn encrypt_base64(
        &self,
        record: &TokenRecord,
        direction: TunnelDirection,
        plaintext: &[u8],
    ) -> DomainResult<String> {
        Ok(BASE64.encode(self.encrypt(record, direction, plaintext)?))
    }

    /// [`decrypt`](Self::decrypt) for a base64 envelope
    pub fn decrypt_base64(
        &self,
        record: &TokenRecord,
        direction: TunnelDirection,
        envelope: &str,
    ) -> DomainResult<Vec<u8>> {
        let bytes = BASE64
            .decode(envelope.trim())
            .map_err(|_| DomainError::bad_token("tunnel payload is not base64"))?;
        self.decrypt(record, direction, &bytes)
    }

    /// Seal `plaintext` for the holder of `key`'s private half
    pub fn seal_with(&self, key: &PublicKey, plaintext: &[u8]) -> DomainResult<Vec<u8>> {
        let mut session_key = [0u8; SESSION_KEY_LEN];
        OsRng.fill_bytes(&mut session_key);
        let nonce = generate_nonce();

        let wrapped = KeyPairService::encrypt(key, &session_key)
            .ok_or_else(|| DomainError::bad_token("session key could not be wrapped"))?;
        let wrapped_len = u16::try_from(wrapped.len())
            .map_err(|_| DomainError::bad_token("wrapped session key too large"))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&session_key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| DomainError::bad_token("tunnel payload encryption failed"))?;

        let mut envelope = Vec::with_capacity(
            LENGTH_PREFIX_LEN + wrapped.len() + ENVELOPE_NONCE_LEN + ciphertext.len(),
        );
        envelope.extend_from_slice(&wrapped_len.to_be_bytes());
        envelope.extend_from_slice(&wrapped);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }

    /// Open an envelope produced by [`seal_with`](Self::seal_with)
    pub fn open_with(&self, key: &PrivateKey, envelope: &[u8]) -> DomainResult<Vec<u8>> {
        if envelope.len() < LENGTH_PREFIX_LEN {
            return Err(DomainError::bad_token("tunnel envelope truncated"));
        }
        let wrapped_len = u16::from_be_bytes([envelope[0], envelope[1]]) as usize;
        let body = &envelope[LENGTH_PREFIX_LEN..];

        if body.len() < wrapped_len + ENVELOPE_NONCE_LEN + AEAD_TAG_LEN {
            return Err(DomainError::bad_token("tunnel envelope truncated"));
        }
        let (wrapped, rest) = body.split_at(wrapped_len);
        let (nonce, ciphertext) = rest.split_at(ENVELOPE_NONCE_LEN);

        let session_key = KeyPairService::decrypt(key, wrapped)
            .ok_or_else(|| DomainError::bad_token("session key could not be unwrapped"))?;
        if session_key.len() != SESSION_KEY_LEN {
            return Err(DomainError::bad_token("session key has the wrong size"));
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&session_key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::bad_token("tunnel payload authentication failed"))
    }
}

fn tunnel_key<'a>(record: &'a TokenRecord, name: &str) -> DomainResult<&'a str> {
    record
        .extension_str(name)
        .ok_or_else(|| DomainError::bad_token(format!("token carries no {}", name)))
}

fn generate_nonce() -> [u8; ENVELOPE_NONCE_LEN] {
    let mut nonce = [0u8; ENVELOPE_NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
