//! Token store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest RSA modulus accepted for tunnel key pairs. Kept for legacy
/// clients only; new deployments should stay on the default.
pub const MIN_KEY_BITS: usize = 1024;

/// Largest RSA modulus the PKCS#1 key decoder accepts
pub const MAX_KEY_BITS: usize = 4096;

/// Default RSA modulus size for tunnel key pairs
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Digest names accepted for public identifier generation
pub const SUPPORTED_HASH_ALGORITHMS: &[&str] = &["sha256", "sha384", "sha512"];

/// Configuration for the filesystem token store and the key-pair service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenStoreConfig {
    /// Root directory under which the sharded token tree lives
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Permission bits for created directories (unix only)
    ///
    /// Written in octal wherever it comes from: `750`, `"750"` and `"0o750"`
    /// all mean `0o750`.
    #[serde(
        default = "default_dir_mode",
        serialize_with = "octal_mode::serialize",
        deserialize_with = "octal_mode::deserialize"
    )]
    pub dir_mode: u32,

    /// Digest used to derive public identifiers
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    /// RSA modulus size for tunnel key pairs
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,

    /// Append create/disable/enable events to the per-shard audit log
    #[serde(default)]
    pub audit_enabled: bool,

    /// Number of directory levels in the shard fan-out
    #[serde(default = "default_shard_depth")]
    pub shard_depth: usize,

    /// Characters per shard directory name
    #[serde(default = "default_shard_width")]
    pub shard_width: usize,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            dir_mode: default_dir_mode(),
            hash_algorithm: default_hash_algorithm(),
            key_bits: default_key_bits(),
            audit_enabled: false,
            shard_depth: default_shard_depth(),
            shard_width: default_shard_width(),
        }
    }
}

impl TokenStoreConfig {
    /// Create a configuration rooted at `root_dir` with every other setting defaulted
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let root_dir = std::env::var("TOKEN_STORE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.root_dir);
        let dir_mode = std::env::var("TOKEN_STORE_DIR_MODE")
            .ok()
            .and_then(|mode| parse_octal_mode(&mode))
            .unwrap_or(defaults.dir_mode);
        let hash_algorithm = std::env::var("TOKEN_ID_HASH")
            .map(|name| name.to_lowercase())
            .unwrap_or(defaults.hash_algorithm);
        let key_bits = std::env::var("TOKEN_KEY_BITS")
            .ok()
            .and_then(|bits| bits.parse().ok())
            .unwrap_or(defaults.key_bits);
        let audit_enabled = std::env::var("TOKEN_AUDIT_ENABLED")
            .ok()
            .and_then(|flag| flag.parse().ok())
            .unwrap_or(defaults.audit_enabled);

        Self {
            root_dir,
            dir_mode,
            hash_algorithm,
            key_bits,
            audit_enabled,
            ..defaults
        }
    }

    /// Enable or disable the audit log
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Override the key-pair size
    pub fn with_key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }

    /// Check the configuration for values the store cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if !SUPPORTED_HASH_ALGORITHMS.contains(&self.hash_algorithm.as_str()) {
            return Err(format!(
                "Unsupported hash algorithm '{}', expected one of {:?}",
                self.hash_algorithm, SUPPORTED_HASH_ALGORITHMS
            ));
        }

        if self.key_bits < MIN_KEY_BITS {
            return Err(format!(
                "Key size {} is below the minimum of {} bits",
                self.key_bits, MIN_KEY_BITS
            ));
        }

        if self.key_bits > MAX_KEY_BITS {
            return Err(format!(
                "Key size {} is above the maximum of {} bits",
                self.key_bits, MAX_KEY_BITS
            ));
        }

        if self.shard_depth == 0 || self.shard_width == 0 {
            return Err("Shard depth and width must both be positive".to_string());
        }

        // Every valid identifier is at least 8 characters long and must be shardable.
        if self.shard_depth * self.shard_width > 8 {
            return Err(format!(
                "Shard fan-out {}x{} consumes more than 8 identifier characters",
                self.shard_depth, self.shard_width
            ));
        }

        if self.dir_mode > 0o7777 {
            return Err(format!("Invalid directory mode {:o}", self.dir_mode));
        }

        Ok(())
    }
}

/// Parse a permission mode such as `750` or `0o750`
pub fn parse_octal_mode(value: &str) -> Option<u32> {
    let digits = value.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8).ok()
}

mod octal_mode {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::parse_octal_mode;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Notation {
        Digits(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(mode: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0o{:o}", mode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let text = match Notation::deserialize(deserializer)? {
            Notation::Digits(digits) => digits.to_string(),
            Notation::Text(text) => text,
        };
        parse_octal_mode(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid octal directory mode '{}'", text)))
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("var/tokens")
}

fn default_dir_mode() -> u32 {
    0o750
}

fn default_hash_algorithm() -> String {
    String::from("sha256")
}

fn default_key_bits() -> usize {
    DEFAULT_KEY_BITS
}

fn default_shard_depth() -> usize {
    4
}

fn default_shard_width() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TokenStoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.key_bits, 2048);
        assert_eq!(config.shard_depth * config.shard_width, 8);
    }

    #[test]
    fn test_rejects_small_keys() {
        let config = TokenStoreConfig::default().with_key_bits(512);
        let err = config.validate().unwrap_err();
        assert!(err.contains("minimum"));

        assert!(TokenStoreConfig::default().with_key_bits(1024).validate().is_ok());
    }

    #[test]
    fn test_rejects_keys_the_decoder_cannot_read() {
        let err = TokenStoreConfig::default().with_key_bits(4608).validate().unwrap_err();
        assert!(err.contains("maximum"));

        assert!(TokenStoreConfig::default().with_key_bits(8192).validate().is_err());
        assert!(TokenStoreConfig::default().with_key_bits(4096).validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_digest() {
        let config = TokenStoreConfig {
            hash_algorithm: "md5".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_fan_out() {
        let config = TokenStoreConfig {
            shard_depth: 5,
            shard_width: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dir_mode_is_octal_in_documents() {
        let numeric: TokenStoreConfig = serde_json::from_str(r#"{"dir_mode": 750}"#).unwrap();
        assert_eq!(numeric.dir_mode, 0o750);

        let text: TokenStoreConfig = serde_json::from_str(r#"{"dir_mode": "0o700"}"#).unwrap();
        assert_eq!(text.dir_mode, 0o700);

        assert!(serde_json::from_str::<TokenStoreConfig>(r#"{"dir_mode": 488}"#).is_err());

        let written = serde_json::to_value(&TokenStoreConfig::default()).unwrap();
        assert_eq!(written["dir_mode"], "0o750");
        let reread: TokenStoreConfig = serde_json::from_value(written).unwrap();
        assert_eq!(reread.dir_mode, 0o750);
    }

    #[test]
    fn test_parse_octal_mode() {
        assert_eq!(parse_octal_mode("750"), Some(0o750));
        assert_eq!(parse_octal_mode("0o700"), Some(0o700));
        assert_eq!(parse_octal_mode("rwx"), None);
    }
}
