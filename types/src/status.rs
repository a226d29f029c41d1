//! Status enums for the verification state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The verification state of an [`Identity`](crate::Identity).
///
/// Only the reconciler moves an identity into `Verified` or `Rejected`, and
/// only as a cascade from its current verification reaching a terminal
/// status. The status is never set directly by a webhook payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    /// Identity exists but no verification session has produced a result.
    PendingVerification,
    /// A verification session is open with a provider.
    VerificationInProgress,
    /// The current verification was approved.
    Verified,
    /// The current verification was rejected.
    Rejected,
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PendingVerification => "pending_verification",
            Self::VerificationInProgress => "verification_in_progress",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// How thoroughly an identity has been verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    None,
    Basic,
    /// Granted when a provider verification is approved.
    Enhanced,
    Premium,
}

/// The status of a single [`Verification`](crate::Verification) attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Awaiting a terminal result from the provider.
    InReview,
    Approved,
    Rejected,
}

impl VerificationStatus {
    /// Whether this status ends the verification attempt. Terminal statuses
    /// never transition again; repeated deliveries of the same terminal
    /// outcome are idempotent no-ops.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// The processing status of an uploaded document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Verified,
    Rejected,
}

impl DocumentStatus {
    /// Whether OCR/analysis for this document has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Lifecycle of an issued credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Issued,
    Revoked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!VerificationStatus::InReview.is_terminal());
        assert!(VerificationStatus::Approved.is_terminal());
        assert!(VerificationStatus::Rejected.is_terminal());
        assert!(!DocumentStatus::Processing.is_terminal());
        assert!(DocumentStatus::Verified.is_terminal());
    }

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&IdentityStatus::VerificationInProgress).unwrap(),
            "\"verification_in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationStatus::InReview).unwrap(),
            "\"in_review\""
        );
    }
}
