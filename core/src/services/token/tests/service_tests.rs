//! Tests for issuance, resolution, permissions and revocation

use std::sync::Arc;

use serde_json::json;

use super::create_test_service;
use crate::domain::entities::subtype::TokenSubtype;
use crate::domain::entities::token::{ExtensionData, NewToken};
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenStore;
use crate::services::permission::SubtypeRegistry;
use crate::services::token::{TokenService, TokenServiceConfig};

fn registry_with_inheritance() -> SubtypeRegistry {
    SubtypeRegistry::standard()
        .with(TokenSubtype::new("base", ["y"]))
        .unwrap()
        .with(TokenSubtype::new("child", ["x"]).with_parent("base"))
        .unwrap()
}

#[tokio::test]
async fn test_issue_then_resolve() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());

    let issued = service
        .issue(42, Some("sig".to_string()), 3600, "access", Some("10.0.0.9".to_string()), None)
        .await
        .unwrap();
    let resolved = service.resolve(issued.public_id(), "access").await.unwrap();

    assert_eq!(resolved, issued);
    assert_eq!(resolved.user_id(), 42);
    assert_eq!(resolved.lifetime_seconds(), 3600);
    assert!(resolved.has_permission("ACCESS"));
    assert_eq!(resolved.registration_client_address(), Some("10.0.0.9"));
    assert!(resolved.extension_data().is_empty());
}

#[tokio::test]
async fn test_unknown_subtype_is_configuration_error() {
    let (service, store, _) = create_test_service(SubtypeRegistry::standard());

    let err = service.issue(1, None, 0, "missing", None, None).await.unwrap_err();
    assert!(matches!(err, DomainError::Configuration { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_zero_lifetime_never_expires() {
    let (service, _, clock) = create_test_service(SubtypeRegistry::standard());
    let issued = service.issue(1, None, 0, "access", None, None).await.unwrap();

    clock.advance(100 * 365 * 24 * 3600);
    assert!(service.resolve(issued.public_id(), "access").await.is_ok());
}

#[tokio::test]
async fn test_expiry_boundary() {
    let (service, _, clock) = create_test_service(SubtypeRegistry::standard());
    let issued = service.issue(1, None, 60, "access", None, None).await.unwrap();
    let id = issued.public_id();

    clock.set(issued.issued_at() + 59);
    assert!(service.resolve(id, "access").await.is_ok());

    clock.set(issued.issued_at() + 60);
    let err = service.resolve(id, "access").await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::ExpiredToken)));

    clock.set(issued.issued_at() + 6000);
    assert!(service.resolve(id, "access").await.unwrap_err().is_expired());
}

#[tokio::test]
async fn test_revoke_and_restore() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let issued = service.issue(9, None, 0, "access", None, None).await.unwrap();
    let id = issued.public_id();

    service.revoke(id).await.unwrap();
    assert!(service.resolve(id, "access").await.unwrap_err().is_bad_token());
    assert!(service.revoke(id).await.unwrap_err().is_no_access());

    service.restore(id).await.unwrap();
    assert_eq!(service.resolve(id, "access").await.unwrap(), issued);
    assert!(service.restore(id).await.unwrap_err().is_no_access());
}

#[tokio::test]
async fn test_revoke_unknown_and_unsafe_ids() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());

    assert!(service.revoke("0123456789abcdef").await.unwrap_err().is_no_access());
    assert!(service.restore("0123456789abcdef").await.unwrap_err().is_no_access());
    assert!(service.revoke("../0123456789").await.unwrap_err().is_bad_token());
    assert!(service.resolve("a\\b\\c\\d\\e", "access").await.unwrap_err().is_bad_token());
}

#[tokio::test]
async fn test_revoked_token_hides_expiry_until_restored() {
    // The in-memory store hides disabled records, so a revoked token is BadToken
    // regardless of expiry.
    let (service, _, clock) = create_test_service(SubtypeRegistry::standard());
    let issued = service.issue(1, None, 10, "access", None, None).await.unwrap();

    service.revoke(issued.public_id()).await.unwrap();
    clock.set(issued.issued_at() + 10);
    assert!(service.resolve(issued.public_id(), "access").await.unwrap_err().is_bad_token());

    service.restore(issued.public_id()).await.unwrap();
    assert!(service.resolve(issued.public_id(), "access").await.unwrap_err().is_expired());
}

#[tokio::test]
async fn test_subtype_mismatch_on_resolve() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let issued = service.issue(1, None, 0, "access", None, None).await.unwrap();

    assert!(service.resolve(issued.public_id(), "tunnel").await.unwrap_err().is_bad_token());
}

#[tokio::test]
async fn test_inherited_permissions() {
    let (service, _, _) = create_test_service(registry_with_inheritance());
    let record = service.issue(3, None, 0, "child", None, None).await.unwrap();

    assert_eq!(
        record.permissions().iter().cloned().collect::<Vec<_>>(),
        vec!["x".to_string(), "y".to_string()]
    );
    assert!(service.check_permissions(&record, &["x", "y"]).unwrap());
    assert!(service.check_permissions(&record, &["X"]).unwrap());
    assert!(!service.check_permissions(&record, &["z"]).unwrap());
    assert!(!service.check_permissions(&record, &["x", "z"]).unwrap());
}

#[tokio::test]
async fn test_empty_requirement_uses_declared_permissions() {
    let (service, _, _) = create_test_service(registry_with_inheritance());
    let child = service.issue(3, None, 0, "child", None, None).await.unwrap();
    let base = service.issue(3, None, 0, "base", None, None).await.unwrap();

    assert!(service.check_permissions(&child, &[]).unwrap());
    assert!(service.check_permissions(&base, &[]).unwrap());
}

#[tokio::test]
async fn test_require_permissions() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let record = service.issue(3, None, 0, "access", None, None).await.unwrap();

    service.require_permissions(&record, &["access"]).unwrap();
    let err = service.require_permissions(&record, &["admin"]).unwrap_err();
    assert!(err.is_no_access());
    assert_eq!(err.to_string(), "Access denied");
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let first = service.issue(5, None, 0, "access", None, None).await.unwrap();
    service.issue(5, None, 0, "access", None, None).await.unwrap();
    let other = service.issue(6, None, 0, "access", None, None).await.unwrap();

    assert_eq!(service.revoke_all_for_user(5).await.unwrap(), 2);
    assert!(service.resolve(first.public_id(), "access").await.is_err());
    assert!(service.resolve(other.public_id(), "access").await.is_ok());
}

#[tokio::test]
async fn test_verify_signature() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let signed = service
        .issue(5, Some("abc".to_string()), 0, "access", None, None)
        .await
        .unwrap();
    let unsigned = service.issue(5, None, 0, "access", None, None).await.unwrap();

    service.verify_signature(&signed, "abc").unwrap();
    assert!(service.verify_signature(&signed, "changed").unwrap_err().is_bad_token());
    service.verify_signature(&unsigned, "anything").unwrap();
}

#[tokio::test]
async fn test_client_token_for_plain_token() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let record = service.issue(5, None, 120, "access", None, None).await.unwrap();

    let client = service.client_token(&record);
    assert_eq!(client.access_identifier, record.public_id());
    assert_eq!(client.expires_at_or_zero, record.issued_at() + 120);
    assert!(!client.is_tunnel());

    let json = serde_json::to_value(&client).unwrap();
    assert_eq!(json, json!({
        "accessIdentifier": record.public_id(),
        "expiresAtOrZero": record.issued_at() + 120,
    }));
}

#[tokio::test]
async fn test_caller_extension_data() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());

    let mut data = ExtensionData::new();
    data.insert("device".to_string(), json!({"model": "x1"}));
    let record = service
        .issue_token(NewToken::new(1, "access").with_extension_data(data))
        .await
        .unwrap();
    assert_eq!(record.extension("device"), Some(&json!({"model": "x1"})));

    let mut reserved = ExtensionData::new();
    reserved.insert("__tunnel_client_encrypt_key".to_string(), json!("00"));
    let err = service
        .issue_token(NewToken::new(1, "access").with_extension_data(reserved))
        .await
        .unwrap_err();
    assert!(err.is_bad_token());
}

#[tokio::test]
async fn test_issue_ignores_caller_permissions() {
    let (service, _, _) = create_test_service(SubtypeRegistry::standard());
    let record = service
        .issue_token(NewToken::new(1, "access").with_permissions(["admin"]))
        .await
        .unwrap();

    assert!(!record.has_permission("admin"));
    assert!(record.has_permission("access"));
}

#[test]
fn test_small_key_size_is_rejected() {
    let result = TokenService::new(
        crate::repositories::InMemoryTokenStore::new(),
        Arc::new(SubtypeRegistry::standard()),
        TokenServiceConfig::default().with_key_bits(512),
    );
    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_resolve() {
    let (service, store, _) = create_test_service(SubtypeRegistry::standard());
    let service = Arc::new(service);

    let handles: Vec<_> = (0..100u64)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.issue(i, None, 0, "access", None, None).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().public_id().to_string());
    }

    assert_eq!(store.len().await, 100);
    for id in ids {
        assert!(store.find(&id, "access").await.unwrap().is_some());
    }
}
