//! Tests for the hybrid tunnel envelope

use super::shared_pairs;
use crate::services::crypto::{TunnelCodec, ENVELOPE_NONCE_LEN};

#[test]
fn test_seal_open_round_trip() {
    let (pair, _) = shared_pairs();
    let codec = TunnelCodec::new();
    let payload = vec![0x5au8; 4096];

    let envelope = codec.seal_with(&pair.public, &payload).unwrap();
    let wrapped_len = u16::from_be_bytes([envelope[0], envelope[1]]) as usize;
    assert_eq!(wrapped_len, 128);
    assert_eq!(envelope.len(), 2 + wrapped_len + ENVELOPE_NONCE_LEN + payload.len() + 16);

    assert_eq!(codec.open_with(&pair.private, &envelope).unwrap(), payload);
}

#[test]
fn test_empty_payload() {
    let (pair, _) = shared_pairs();
    let codec = TunnelCodec::new();

    let envelope = codec.seal_with(&pair.public, b"").unwrap();
    assert!(codec.open_with(&pair.private, &envelope).unwrap().is_empty());
}

#[test]
fn test_envelopes_are_randomized() {
    let (pair, _) = shared_pairs();
    let codec = TunnelCodec::new();

    let first = codec.seal_with(&pair.public, b"same").unwrap();
    let second = codec.seal_with(&pair.public, b"same").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_wrong_key_is_bad_token() {
    let (pair, other) = shared_pairs();
    let codec = TunnelCodec::new();

    let envelope = codec.seal_with(&pair.public, b"secret").unwrap();
    let err = codec.open_with(&other.private, &envelope).unwrap_err();
    assert!(err.is_bad_token());
}

#[test]
fn test_tampered_ciphertext_is_bad_token() {
    let (pair, _) = shared_pairs();
    let codec = TunnelCodec::new();

    let mut envelope = codec.seal_with(&pair.public, b"secret").unwrap();
    let last = envelope.len() - 1;
    envelope[last] ^= 0x01;

    assert!(codec.open_with(&pair.private, &envelope).unwrap_err().is_bad_token());
}

#[test]
fn test_truncated_envelopes_are_bad_token() {
    let (pair, _) = shared_pairs();
    let codec = TunnelCodec::new();
    let envelope = codec.seal_with(&pair.public, b"secret").unwrap();

    for len in [0, 1, 2, 100, envelope.len() - 7] {
        let err = codec.open_with(&pair.private, &envelope[..len]).unwrap_err();
        assert!(err.is_bad_token(), "length {} should fail", len);
    }

    let mut bogus_length = envelope.clone();
    bogus_length[0] = 0xff;
    assert!(codec.open_with(&pair.private, &bogus_length).unwrap_err().is_bad_token());
}
