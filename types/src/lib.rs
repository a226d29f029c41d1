//! Fundamental types for the Verident reconciliation engine.
//!
//! This crate defines the entity model shared across every other crate in the
//! workspace: identities, verifications, documents, credentials, audit
//! entries, status enums, id newtypes, timestamps, and the canonical
//! verification outcome produced by provider adapters.

pub mod audit;
pub mod entity;
pub mod id;
pub mod outcome;
pub mod status;
pub mod time;

pub use audit::{AuditEntry, EntityType};
pub use entity::{Identity, VerifiableCredential, Verification, VerificationDocument};
pub use id::{CredentialId, DocumentId, IdentityId, VerificationId};
pub use outcome::VerificationOutcome;
pub use status::{
    CredentialStatus, DocumentStatus, IdentityStatus, VerificationLevel, VerificationStatus,
};
pub use time::Timestamp;
