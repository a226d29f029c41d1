//! Identity storage trait.

use verident_types::{Identity, IdentityId};

use crate::StoreError;

pub trait IdentityStore: Send + Sync {
    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError>;

    /// Conditional write: succeeds only when `identity.version` matches the
    /// stored version (or the id is new and the version is 0). On success
    /// the stored version is `identity.version + 1`.
    fn put_identity(&self, identity: &Identity) -> Result<(), StoreError>;
}
