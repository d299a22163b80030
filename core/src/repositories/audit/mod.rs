//! Audit sink module.

mod r#trait;
pub use r#trait::AuditSink;

mod noop;
pub use noop::NoOpAuditSink;

mod memory;
pub use memory::MemoryAuditSink;

#[cfg(test)]
mod tests;
