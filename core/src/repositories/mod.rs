pub mod audit;
pub mod token;

pub use audit::{AuditSink, MemoryAuditSink, NoOpAuditSink};
pub use token::{InMemoryTokenStore, TokenStore};
