//! Audit entries for token access-state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access-state change recorded in the audit log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Disable,
    Enable,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Disable => "disable",
            Self::Enable => "enable",
        }
    }
}

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the change happened
    pub at: DateTime<Utc>,

    pub action: AuditAction,

    pub public_id: String,

    /// Known for `create`; enable/disable only see the identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, public_id: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            action,
            public_id: public_id.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Serializes the entry as a single newline-terminated JSON line
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Day bucket (UTC) the entry belongs to, e.g. `2026-10-19`
    pub fn bucket(&self) -> String {
        self.at.format("%Y-%m-%d").to_string()
    }
}
