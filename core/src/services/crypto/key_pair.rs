//! RSA key pair generation and raw encryption

use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use tg_shared::config::storage::{DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};

use crate::errors::{DomainError, DomainResult};

/// Bytes PKCS#1 v1.5 padding takes out of every RSA block
pub const PKCS1_PADDING_OVERHEAD: usize = 11;

/// RSA public key
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Lowercase hex of the PKCS#1 DER encoding
    pub fn to_hex(&self) -> DomainResult<String> {
        let der = self
            .0
            .to_pkcs1_der()
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to encode public key: {}", e),
            })?;
        Ok(hex::encode(der.as_bytes()))
    }

    /// Parses the output of [`to_hex`](Self::to_hex). Malformed input is `BadToken`.
    pub fn from_hex(value: &str) -> DomainResult<Self> {
        let der = hex::decode(value).map_err(|_| DomainError::bad_token("public key is not hex"))?;
        RsaPublicKey::from_pkcs1_der(&der)
            .map(Self)
            .map_err(|_| DomainError::bad_token("public key is not PKCS#1 DER"))
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }

    /// Largest plaintext a single PKCS#1 v1.5 block can carry
    pub fn max_plaintext_len(&self) -> usize {
        self.0.size().saturating_sub(PKCS1_PADDING_OVERHEAD)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("bits", &self.bits()).finish()
    }
}

/// RSA private key
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Lowercase hex of the PKCS#1 DER encoding
    pub fn to_hex(&self) -> DomainResult<String> {
        let der = self
            .0
            .to_pkcs1_der()
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to encode private key: {}", e),
            })?;
        Ok(hex::encode(der.as_bytes()))
    }

    /// Parses the output of [`to_hex`](Self::to_hex). Malformed input is `BadToken`.
    pub fn from_hex(value: &str) -> DomainResult<Self> {
        let der = hex::decode(value).map_err(|_| DomainError::bad_token("private key is not hex"))?;
        RsaPrivateKey::from_pkcs1_der(&der)
            .map(Self)
            .map_err(|_| DomainError::bad_token("private key is not PKCS#1 DER"))
    }

    /// Passphrase-protected PKCS#8 PEM export
    pub fn export_protected(&self, passphrase: &str) -> DomainResult<String> {
        self.0
            .to_pkcs8_encrypted_pem(&mut OsRng, passphrase.as_bytes(), LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to export private key: {}", e),
            })
    }

    /// Reads a key written by [`export_protected`](Self::export_protected).
    /// A wrong passphrase or a malformed document is `BadToken`.
    pub fn import_protected(pem: &str, passphrase: &str) -> DomainResult<Self> {
        RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase.as_bytes())
            .map(Self)
            .map_err(|_| DomainError::bad_token("protected private key could not be opened"))
    }

    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }
}

// Never print key material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("bits", &self.bits()).finish_non_exhaustive()
    }
}

/// A matching public/private key pair
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Stateless RSA helper
#[derive(Debug, Clone, Copy)]
pub struct KeyPairService {
    bits: usize,
}

impl Default for KeyPairService {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
        }
    }
}

impl KeyPairService {
    /// Creates a service generating `bits`-sized keys
    ///
    /// # Errors
    ///
    /// `DomainError::Configuration` if `bits` is outside 1024..=4096
    pub fn new(bits: usize) -> DomainResult<Self> {
        check_bits(bits)?;
        Ok(Self { bits })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Generates a key pair of the configured size
    ///
    /// CPU-heavy; async callers should run it on a blocking thread.
    pub fn generate(&self) -> DomainResult<KeyPair> {
        Self::generate_with_bits(self.bits)
    }

    /// Generates a key pair of an explicit size
    pub fn generate_with_bits(bits: usize) -> DomainResult<KeyPair> {
        check_bits(bits)?;

        let private = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
            DomainError::configuration(format!("RSA key generation failed: {}", e))
        })?;
        let public = private.to_public_key();

        tracing::debug!(event = "key_pair_generated", bits = bits);

        Ok(KeyPair {
            public: PublicKey(public),
            private: PrivateKey(private),
        })
    }

    /// PKCS#1 v1.5 encryption of a single block
    ///
    /// Returns `None` on failure, including plaintext longer than
    /// [`PublicKey::max_plaintext_len`].
    pub fn encrypt(key: &PublicKey, plaintext: &[u8]) -> Option<Vec<u8>> {
        if plaintext.len() > key.max_plaintext_len() {
            return None;
        }
        key.0.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext).ok()
    }

    /// PKCS#1 v1.5 decryption. Returns `None` on failure.
    pub fn decrypt(key: &PrivateKey, ciphertext: &[u8]) -> Option<Vec<u8>> {
        key.0.decrypt(Pkcs1v15Encrypt, ciphertext).ok()
    }

    /// Largest plaintext `encrypt` accepts for `key`
    pub fn max_plaintext_len(key: &PublicKey) -> usize {
        key.max_plaintext_len()
    }
}

fn check_bits(bits: usize) -> DomainResult<()> {
    if bits < MIN_KEY_BITS {
        return Err(DomainError::configuration(format!(
            "RSA key size {} is below the minimum of {} bits",
            bits, MIN_KEY_BITS
        )));
    }
    if bits > MAX_KEY_BITS {
        return Err(DomainError::configuration(format!(
            "RSA key size {} is above the maximum of {} bits",
            bits, MAX_KEY_BITS
        )));
    }
    Ok(())
}
