//! Configuration for the token service

use tg_shared::config::storage::DEFAULT_KEY_BITS;
use tg_shared::TokenStoreConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// RSA modulus size for tunnel key pairs
    pub key_bits: usize,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl TokenServiceConfig {
    pub fn with_key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }
}

impl From<&TokenStoreConfig> for TokenServiceConfig {
    fn from(config: &TokenStoreConfig) -> Self {
        Self {
            key_bits: config.key_bits,
        }
    }
}
