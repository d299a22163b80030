use crate::domain::entities::audit::{AuditAction, AuditEntry};
use crate::repositories::audit::{AuditSink, MemoryAuditSink, NoOpAuditSink};

#[tokio::test]
async fn test_memory_sink_records_in_order() {
    let sink = MemoryAuditSink::new();
    sink.append(&AuditEntry::new(AuditAction::Create, "abcdef1234").with_user(1))
        .await
        .unwrap();
    sink.append(&AuditEntry::new(AuditAction::Disable, "abcdef1234"))
        .await
        .unwrap();
    sink.append(&AuditEntry::new(AuditAction::Create, "0123456789"))
        .await
        .unwrap();

    assert_eq!(sink.entries().await.len(), 3);
    assert_eq!(
        sink.actions_for("abcdef1234").await,
        vec![AuditAction::Create, AuditAction::Disable]
    );
}

#[tokio::test]
async fn test_memory_sink_failure_mode() {
    let sink = MemoryAuditSink::new();
    sink.set_failing(true);

    let err = sink
        .append(&AuditEntry::new(AuditAction::Enable, "abcdef1234"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "STORE_IO");
    assert!(sink.entries().await.is_empty());
}

#[tokio::test]
async fn test_noop_sink_accepts_everything() {
    let sink = NoOpAuditSink;
    assert!(sink
        .append(&AuditEntry::new(AuditAction::Create, "abcdef1234"))
        .await
        .is_ok());
}
