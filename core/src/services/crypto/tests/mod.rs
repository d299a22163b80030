mod key_pair_tests;
mod tunnel_codec_tests;

use std::sync::OnceLock;

use super::{KeyPair, KeyPairService};

/// Key size used throughout the tests to keep generation fast
pub(crate) const TEST_KEY_BITS: usize = 1024;

/// Two shared key pairs, generated once per test binary
pub(crate) fn shared_pairs() -> &'static (KeyPair, KeyPair) {
    static PAIRS: OnceLock<(KeyPair, KeyPair)> = OnceLock::new();
    PAIRS.get_or_init(|| {
        let service = KeyPairService::new(TEST_KEY_BITS).unwrap();
        (service.generate().unwrap(), service.generate().unwrap())
    })
}
