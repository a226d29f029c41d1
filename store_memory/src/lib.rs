//! In-memory storage backend.
//!
//! Implements every `verident-store` trait over mutex-guarded maps. Used by
//! the daemon (the production object store is an external collaborator) and
//! by every test in the workspace. Thread-safe for tokio's multi-threaded
//! runtime.
//!
//! Writes enforce the optimistic-concurrency contract: a put whose entity
//! version does not match the stored version fails with
//! [`StoreError::VersionConflict`] and mutates nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use verident_store::{
    AuditStore, CredentialStore, DocumentStore, IdentityStore, StoreError, VerificationStore,
};
use verident_types::{
    AuditEntry, CredentialId, DocumentId, Identity, IdentityId, VerifiableCredential,
    Verification, VerificationDocument, VerificationId,
};

/// Thread-safe in-memory store for all five entity collections.
#[derive(Default)]
pub struct MemoryStore {
    identities: Mutex<HashMap<String, Identity>>,
    verifications: Mutex<HashMap<String, Verification>>,
    /// `(provider, external_verification_id)` → verification id.
    external_index: Mutex<HashMap<(String, String), String>>,
    documents: Mutex<HashMap<String, VerificationDocument>>,
    /// Document ids per verification, in insertion order.
    documents_by_verification: Mutex<HashMap<String, Vec<String>>>,
    credentials: Mutex<HashMap<String, VerifiableCredential>>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All audit entries appended so far, oldest first. Test introspection;
    /// the engine itself never reads the trail.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().unwrap().clone()
    }

    pub fn audit_count(&self) -> usize {
        self.audit.lock().unwrap().len()
    }
}

/// Version check shared by every collection: accept when the incoming
/// version matches the stored one (or the key is new), store with the
/// version bumped.
fn check_version(
    stored: Option<u64>,
    incoming: u64,
    entity: &str,
    id: &str,
) -> Result<(), StoreError> {
    match stored {
        None if incoming == 0 => Ok(()),
        None => Err(StoreError::VersionConflict {
            entity: format!("{entity}:{id}"),
            expected: incoming,
            stored: 0,
        }),
        Some(v) if v == incoming => Ok(()),
        Some(v) => Err(StoreError::VersionConflict {
            entity: format!("{entity}:{id}"),
            expected: incoming,
            stored: v,
        }),
    }
}

impl IdentityStore for MemoryStore {
    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError> {
        self.identities
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap();
        let stored = identities.get(identity.id.as_str()).map(|i| i.version);
        check_version(stored, identity.version, "identity", identity.id.as_str())?;
        let mut updated = identity.clone();
        updated.version += 1;
        identities.insert(identity.id.to_string(), updated);
        Ok(())
    }
}

impl VerificationStore for MemoryStore {
    fn get_verification(&self, id: &VerificationId) -> Result<Verification, StoreError> {
        self.verifications
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn find_by_external_id(
        &self,
        provider: &str,
        external_id: &str,
    ) -> Result<Option<Verification>, StoreError> {
        let key = (provider.to_string(), external_id.to_string());
        // Never hold the index and collection locks together: writers take
        // them in the opposite order.
        let id = self.external_index.lock().unwrap().get(&key).cloned();
        match id {
            Some(id) => Ok(self.verifications.lock().unwrap().get(&id).cloned()),
            None => Ok(None),
        }
    }

    fn put_verification(&self, verification: &Verification) -> Result<(), StoreError> {
        let mut verifications = self.verifications.lock().unwrap();
        let stored = verifications
            .get(verification.id.as_str())
            .map(|v| v.version);
        check_version(
            stored,
            verification.version,
            "verification",
            verification.id.as_str(),
        )?;
        self.external_index.lock().unwrap().insert(
            (
                verification.provider.clone(),
                verification.external_verification_id.clone(),
            ),
            verification.id.to_string(),
        );
        let mut updated = verification.clone();
        updated.version += 1;
        verifications.insert(verification.id.to_string(), updated);
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn get_document(&self, id: &DocumentId) -> Result<VerificationDocument, StoreError> {
        self.documents
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn documents_for_verification(
        &self,
        verification_id: &VerificationId,
    ) -> Result<Vec<VerificationDocument>, StoreError> {
        let by_verification = self.documents_by_verification.lock().unwrap();
        let documents = self.documents.lock().unwrap();
        Ok(by_verification
            .get(verification_id.as_str())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| documents.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn put_document(&self, document: &VerificationDocument) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().unwrap();
        let stored = documents.get(document.id.as_str()).map(|d| d.version);
        check_version(stored, document.version, "document", document.id.as_str())?;
        if stored.is_none() {
            self.documents_by_verification
                .lock()
                .unwrap()
                .entry(document.verification_id.to_string())
                .or_default()
                .push(document.id.to_string());
        }
        let mut updated = document.clone();
        updated.version += 1;
        documents.insert(document.id.to_string(), updated);
        Ok(())
    }
}

impl CredentialStore for MemoryStore {
    fn get_credential(&self, id: &CredentialId) -> Result<VerifiableCredential, StoreError> {
        self.credentials
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_credential(&self, credential: &VerifiableCredential) -> Result<(), StoreError> {
        let mut credentials = self.credentials.lock().unwrap();
        let stored = credentials.get(credential.id.as_str()).map(|c| c.version);
        check_version(
            stored,
            credential.version,
            "credential",
            credential.id.as_str(),
        )?;
        let mut updated = credential.clone();
        updated.version += 1;
        credentials.insert(credential.id.to_string(), updated);
        Ok(())
    }
}

impl AuditStore for MemoryStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.audit.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
