//! Verification storage trait.

use verident_types::{Verification, VerificationId};

use crate::StoreError;

pub trait VerificationStore: Send + Sync {
    fn get_verification(&self, id: &VerificationId) -> Result<Verification, StoreError>;

    /// Look up a verification by its provider-assigned correlation key.
    /// External ids are unique per provider, not globally, so the provider
    /// slug is part of the key.
    fn find_by_external_id(
        &self,
        provider: &str,
        external_id: &str,
    ) -> Result<Option<Verification>, StoreError>;

    /// Conditional write, same version contract as
    /// [`IdentityStore::put_identity`](crate::IdentityStore::put_identity).
    fn put_verification(&self, verification: &Verification) -> Result<(), StoreError>;
}
