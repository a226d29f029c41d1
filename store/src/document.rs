//! Verification document storage trait.

use verident_types::{DocumentId, VerificationDocument, VerificationId};

use crate::StoreError;

pub trait DocumentStore: Send + Sync {
    fn get_document(&self, id: &DocumentId) -> Result<VerificationDocument, StoreError>;

    /// All documents uploaded for one verification, in insertion order.
    fn documents_for_verification(
        &self,
        verification_id: &VerificationId,
    ) -> Result<Vec<VerificationDocument>, StoreError>;

    /// Conditional write, same version contract as
    /// [`IdentityStore::put_identity`](crate::IdentityStore::put_identity).
    fn put_document(&self, document: &VerificationDocument) -> Result<(), StoreError>;
}
