//! Canonical verification outcome.
//!
//! Every provider adapter normalizes its own payload vocabulary into this one
//! shape; everything downstream of the adapters (reconciler, audit, dispatch)
//! speaks only in canonical outcomes.

use serde::{Deserialize, Serialize};

use crate::status::VerificationStatus;

/// A provider callback reduced to the fields the reconciler acts on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// The provider's correlation key (`external_verification_id`).
    pub external_id: String,
    /// Canonical status: `Approved`, `Rejected`, or `InReview`.
    pub status: VerificationStatus,
    /// Confidence score, 0–100.
    pub score: u8,
}

impl VerificationOutcome {
    pub fn new(external_id: impl Into<String>, status: VerificationStatus, score: u8) -> Self {
        Self {
            external_id: external_id.into(),
            status,
            score,
        }
    }
}
