//! Public token identifiers.
//!
//! A public identifier is the hex digest handed to clients. Every identifier
//! coming back from a client is untrusted: it is parsed into a [`PublicId`]
//! before anything derives a storage location from it.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::domain::entities::token::NewToken;
use crate::errors::{DomainError, DomainResult};

/// Shortest identifier the system accepts
pub const MIN_PUBLIC_ID_LEN: usize = 8;

/// Longest identifier the system accepts (a hex-encoded SHA-512 digest)
pub const MAX_PUBLIC_ID_LEN: usize = 128;

/// Bytes of OS randomness mixed into every identifier
const NONCE_LEN: usize = 32;

/// A validated public token identifier: lowercase hex, 8..=128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicId(String);

impl PublicId {
    /// Parse an untrusted identifier.
    ///
    /// Rejects path separators, `..`, drive/scheme separators and anything
    /// outside the hex alphabet with `BadToken`. This performs no I/O.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(DomainError::bad_token("empty identifier"));
        }

        if raw.contains(['/', '\\', ':', '\0']) || raw.contains("..") {
            return Err(DomainError::bad_token("identifier contains path characters"));
        }

        if raw.len() < MIN_PUBLIC_ID_LEN || raw.len() > MAX_PUBLIC_ID_LEN {
            return Err(DomainError::bad_token(format!(
                "identifier length {} out of range",
                raw.len()
            )));
        }

        if !raw.bytes().all(is_digest_char) {
            return Err(DomainError::bad_token("identifier is not lowercase hex"));
        }

        Ok(Self(raw.to_string()))
    }

    /// The identifier as presented to clients
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the leading `depth * width` characters into `depth` segments.
    ///
    /// Returns `None` when the identifier is too short for the requested fan-out.
    pub fn shard_segments(&self, depth: usize, width: usize) -> Option<Vec<&str>> {
        if depth * width > self.0.len() {
            return None;
        }

        Some(
            (0..depth)
                .map(|level| &self.0[level * width..(level + 1) * width])
                .collect(),
        )
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PublicId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Alphabet check used for whole identifiers and individual shard segments
pub fn is_digest_char(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'a'..=b'f')
}

/// Digest used to derive public identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierDigest {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl IdentifierDigest {
    pub fn name(&self) -> &'static str {
        match self {
            IdentifierDigest::Sha256 => "sha256",
            IdentifierDigest::Sha384 => "sha384",
            IdentifierDigest::Sha512 => "sha512",
        }
    }

    /// Hash `data` and return the raw digest bytes
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            IdentifierDigest::Sha256 => Sha256::digest(data).to_vec(),
            IdentifierDigest::Sha384 => Sha384::digest(data).to_vec(),
            IdentifierDigest::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for IdentifierDigest {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(IdentifierDigest::Sha256),
            "sha384" => Ok(IdentifierDigest::Sha384),
            "sha512" => Ok(IdentifierDigest::Sha512),
            other => Err(DomainError::configuration(format!(
                "unsupported identifier digest '{}'",
                other
            ))),
        }
    }
}

/// Generates fresh public identifiers for new tokens.
///
/// The client address and hardware id are mixed in as salt only. Uniqueness
/// and unpredictability come from the OS-random nonce.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierGenerator {
    digest: IdentifierDigest,
}

impl IdentifierGenerator {
    pub fn new(digest: IdentifierDigest) -> Self {
        Self { digest }
    }

    pub fn digest(&self) -> IdentifierDigest {
        self.digest
    }

    /// Derive a new identifier for `token`
    pub fn generate(&self, token: &NewToken) -> DomainResult<PublicId> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut composite = Vec::with_capacity(128);
        composite.extend_from_slice(&token.user_id.to_be_bytes());
        composite.push(0);
        composite.extend_from_slice(token.client_address.as_deref().unwrap_or("").as_bytes());
        composite.push(0);
        composite.extend_from_slice(token.client_hardware_id.as_deref().unwrap_or("").as_bytes());
        composite.push(0);
        composite.extend_from_slice(token.subtype.as_bytes());
        composite.push(0);
        composite.extend_from_slice(
            &chrono::Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_be_bytes(),
        );
        composite.extend_from_slice(&nonce);

        let id = hex::encode(self.digest.digest(&composite));
        if id.len() < MIN_PUBLIC_ID_LEN {
            return Err(DomainError::integrity(format!(
                "generated identifier has only {} characters",
                id.len()
            )));
        }

        Ok(PublicId(id))
    }
}
