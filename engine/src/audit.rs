//! Append-only audit logging.

use std::sync::Arc;

use serde_json::Value;

use verident_store::AuditStore;
use verident_types::{AuditEntry, EntityType, Timestamp};

use crate::error::EngineError;

/// Thin wrapper over the audit collaborator.
///
/// The engine only ever appends; it never reads the trail back (the
/// dispatcher's idempotency is keyed in-process, not on audit reads).
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record one state-changing action. Called after (not instead of) the
    /// primary mutation.
    pub fn record(
        &self,
        action: &str,
        entity_type: EntityType,
        entity_id: &str,
        user_id: Option<&str>,
        details: Value,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let entry = AuditEntry::new(
            action,
            entity_type,
            entity_id,
            user_id.map(str::to_string),
            details,
            now,
        );
        self.store.append(&entry)?;
        Ok(())
    }
}
