//! Asymmetric key pairs and the tunnel payload codec
//!
//! - [`KeyPairService`] generates RSA key pairs and performs raw
//!   PKCS#1 v1.5 encryption with soft (`Option`) failures
//! - [`TunnelCodec`] seals payloads for a tunnel token's peer using a hybrid
//!   RSA + AES-256-GCM envelope

mod key_pair;
mod tunnel;

#[cfg(test)]
mod tests;

pub use key_pair::{KeyPair, KeyPairService, PrivateKey, PublicKey, PKCS1_PADDING_OVERHEAD};
pub use tunnel::{TunnelCodec, TunnelDirection, ENVELOPE_NONCE_LEN, SESSION_KEY_LEN};
