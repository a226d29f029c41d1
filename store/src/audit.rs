//! Audit trail storage trait.
//!
//! Deliberately write-only: the engine appends entries and never reads,
//! updates, or deletes them. Introspection for tests lives on concrete
//! backends, not on this trait.

use verident_types::AuditEntry;

use crate::StoreError;

pub trait AuditStore: Send + Sync {
    /// Append one immutable entry.
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError>;
}
