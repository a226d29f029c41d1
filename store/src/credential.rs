//! Verifiable credential storage trait.

use verident_types::{CredentialId, VerifiableCredential};

use crate::StoreError;

pub trait CredentialStore: Send + Sync {
    fn get_credential(&self, id: &CredentialId) -> Result<VerifiableCredential, StoreError>;

    /// Conditional write, same version contract as
    /// [`IdentityStore::put_identity`](crate::IdentityStore::put_identity).
    fn put_credential(&self, credential: &VerifiableCredential) -> Result<(), StoreError>;
}
