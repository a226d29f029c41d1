//! Persistent entities mutated by the reconciliation engine.
//!
//! Every entity carries a `version` counter used for optimistic concurrency:
//! stores accept a write only when the caller's version matches the stored
//! one, so two concurrent reconciliations of the same record cannot silently
//! clobber each other. A losing writer re-reads and retries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{CredentialId, DocumentId, IdentityId, VerificationId};
use crate::status::{
    CredentialStatus, DocumentStatus, IdentityStatus, VerificationLevel, VerificationStatus,
};
use crate::time::Timestamp;

/// One end user's identity within an organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    /// Owning organization (tenant).
    pub organization_id: String,
    /// The end user this identity belongs to.
    pub user_id: String,
    pub status: IdentityStatus,
    pub verification_level: VerificationLevel,
    /// Set exactly when `status` becomes `Verified`.
    pub verified_at: Option<Timestamp>,
    /// The verification that most recently changed `status`.
    pub current_verification: Option<VerificationId>,
    /// Transaction that anchored this identity on chain, once observed.
    pub blockchain_tx_hash: Option<String>,
    pub blockchain_network: Option<String>,
    pub token_id: Option<String>,
    pub blockchain_address: Option<String>,
    /// Optimistic concurrency counter, incremented by the store on write.
    pub version: u64,
}

impl Identity {
    /// A fresh identity awaiting its first verification result.
    pub fn new(id: IdentityId, organization_id: String, user_id: String) -> Self {
        Self {
            id,
            organization_id,
            user_id,
            status: IdentityStatus::PendingVerification,
            verification_level: VerificationLevel::None,
            verified_at: None,
            current_verification: None,
            blockchain_tx_hash: None,
            blockchain_network: None,
            token_id: None,
            blockchain_address: None,
            version: 0,
        }
    }
}

/// One verification attempt at a provider.
///
/// Created when a provider session starts (outside this subsystem) with
/// `external_verification_id` already assigned; mutated only by the
/// reconciler; never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Verification {
    pub id: VerificationId,
    /// Owning identity. An identity may have many verifications over time,
    /// but at most one is "current".
    pub identity_id: IdentityId,
    /// Slug of the provider running this session (e.g. "onfido").
    pub provider: String,
    /// Provider-assigned correlation key, unique per provider.
    pub external_verification_id: String,
    pub status: VerificationStatus,
    /// 0–100.
    pub verification_score: u8,
    /// Raw normalized webhook payload, retained for audit.
    pub external_response: Option<Value>,
    pub reviewed_at: Option<Timestamp>,
    pub version: u64,
}

impl Verification {
    /// A verification session awaiting its provider callback.
    pub fn new(
        id: VerificationId,
        identity_id: IdentityId,
        provider: impl Into<String>,
        external_verification_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            identity_id,
            provider: provider.into(),
            external_verification_id: external_verification_id.into(),
            status: VerificationStatus::InReview,
            verification_score: 0,
            external_response: None,
            reviewed_at: None,
            version: 0,
        }
    }
}

/// One uploaded document, owned by a verification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationDocument {
    pub id: DocumentId,
    pub verification_id: VerificationId,
    /// e.g. "passport", "drivers_license".
    pub document_type: String,
    pub status: DocumentStatus,
    pub ocr_data: Option<Value>,
    pub analysis_results: Option<Value>,
    pub verification_score: Option<u8>,
    pub processed_at: Option<Timestamp>,
    pub version: u64,
}

impl VerificationDocument {
    pub fn new(
        id: DocumentId,
        verification_id: VerificationId,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            verification_id,
            document_type: document_type.into(),
            status: DocumentStatus::Uploaded,
            ocr_data: None,
            analysis_results: None,
            verification_score: None,
            processed_at: None,
            version: 0,
        }
    }
}

/// A credential issued once an identity reaches `Verified`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifiableCredential {
    pub id: CredentialId,
    pub identity_id: IdentityId,
    pub status: CredentialStatus,
    pub issued_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub revocation_reason: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub blockchain_network: Option<String>,
    pub token_id: Option<String>,
    pub version: u64,
}

impl VerifiableCredential {
    pub fn new(id: CredentialId, identity_id: IdentityId, issued_at: Timestamp) -> Self {
        Self {
            id,
            identity_id,
            status: CredentialStatus::Issued,
            issued_at,
            revoked_at: None,
            revocation_reason: None,
            blockchain_tx_hash: None,
            blockchain_network: None,
            token_id: None,
            version: 0,
        }
    }
}
