//! Abstract storage traits for the Verident reconciliation engine.
//!
//! The production object store lives outside this subsystem; the engine
//! depends only on these traits, which an in-memory backend
//! (`verident-store-memory`) implements for the daemon and for tests.
//!
//! Every write is conditional: stores compare the entity's `version` field
//! against the stored version and reject stale writes with
//! [`StoreError::VersionConflict`]. Callers retry their read-modify-write.

pub mod audit;
pub mod credential;
pub mod document;
pub mod error;
pub mod identity;
pub mod verification;

pub use audit::AuditStore;
pub use credential::CredentialStore;
pub use document::DocumentStore;
pub use error::StoreError;
pub use identity::IdentityStore;
pub use verification::VerificationStore;
