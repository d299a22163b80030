//! File-backed audit log

mod file_sink;

pub use file_sink::FileAuditSink;
