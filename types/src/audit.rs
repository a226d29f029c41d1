//! Append-only audit trail entries.
//!
//! Every state-changing action in the engine appends one entry after (not
//! instead of) its primary mutation. Entries are immutable: no update or
//! delete operation exists anywhere in the workspace.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::time::Timestamp;

/// The kind of entity an audit entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Identity,
    Verification,
    VerificationDocument,
    VerifiableCredential,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Identity => "identity",
            Self::Verification => "verification",
            Self::VerificationDocument => "verification_document",
            Self::VerifiableCredential => "verifiable_credential",
        };
        f.write_str(s)
    }
}

/// One immutable audit record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    /// What happened, e.g. `verification.reconciled`.
    pub action: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    /// The acting user, or `None` for system-driven actions (webhooks).
    pub user_id: Option<String>,
    pub details: Value,
    pub timestamp: Timestamp,
}

impl AuditEntry {
    pub fn new(
        action: impl Into<String>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        user_id: Option<String>,
        details: Value,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            action: action.into(),
            entity_type,
            entity_id: entity_id.into(),
            user_id,
            details,
            timestamp,
        }
    }
}
