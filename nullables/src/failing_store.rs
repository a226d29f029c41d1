//! A store wrapper whose writes can be made to fail on demand.
//!
//! Used to test the engine's failure semantics: persistence errors must
//! propagate to the webhook caller so the provider retries, and a failed
//! identity cascade must leave the already-persisted verification intact.

use std::sync::atomic::{AtomicBool, Ordering};

use verident_store::{
    AuditStore, CredentialStore, DocumentStore, IdentityStore, StoreError, VerificationStore,
};
use verident_store_memory::MemoryStore;
use verident_types::{
    AuditEntry, CredentialId, DocumentId, Identity, IdentityId, VerifiableCredential,
    Verification, VerificationDocument, VerificationId,
};

/// Delegates to an inner [`MemoryStore`], failing selected write paths with
/// [`StoreError::Backend`] while the corresponding flag is set.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_identity_puts: AtomicBool,
    fail_verification_puts: AtomicBool,
    fail_audit_appends: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_identity_puts(&self, fail: bool) {
        self.fail_identity_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_verification_puts(&self, fail: bool) {
        self.fail_verification_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_audit_appends(&self, fail: bool) {
        self.fail_audit_appends.store(fail, Ordering::SeqCst);
    }

    fn blocked(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Backend(format!("injected {what} failure")))
        } else {
            Ok(())
        }
    }
}

impl IdentityStore for FailingStore {
    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError> {
        self.inner.get_identity(id)
    }

    fn put_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        Self::blocked(&self.fail_identity_puts, "identity put")?;
        self.inner.put_identity(identity)
    }
}

impl VerificationStore for FailingStore {
    fn get_verification(&self, id: &VerificationId) -> Result<Verification, StoreError> {
        self.inner.get_verification(id)
    }

    fn find_by_external_id(
        &self,
        provider: &str,
        external_id: &str,
    ) -> Result<Option<Verification>, StoreError> {
        self.inner.find_by_external_id(provider, external_id)
    }

    fn put_verification(&self, verification: &Verification) -> Result<(), StoreError> {
        Self::blocked(&self.fail_verification_puts, "verification put")?;
        self.inner.put_verification(verification)
    }
}

impl DocumentStore for FailingStore {
    fn get_document(&self, id: &DocumentId) -> Result<VerificationDocument, StoreError> {
        self.inner.get_document(id)
    }

    fn documents_for_verification(
        &self,
        verification_id: &VerificationId,
    ) -> Result<Vec<VerificationDocument>, StoreError> {
        self.inner.documents_for_verification(verification_id)
    }

    fn put_document(&self, document: &VerificationDocument) -> Result<(), StoreError> {
        self.inner.put_document(document)
    }
}

impl CredentialStore for FailingStore {
    fn get_credential(&self, id: &CredentialId) -> Result<VerifiableCredential, StoreError> {
        self.inner.get_credential(id)
    }

    fn put_credential(&self, credential: &VerifiableCredential) -> Result<(), StoreError> {
        self.inner.put_credential(credential)
    }
}

impl AuditStore for FailingStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        Self::blocked(&self.fail_audit_appends, "audit append")?;
        self.inner.append(entry)
    }
}
