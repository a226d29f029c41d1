//! Jumio callback normalization.
//!
//! Jumio delivers one callback per scan with a `verificationStatus` verdict
//! and a `scanReference` correlation key. There is no separate event-type
//! field: every callback is a completion event, so nothing is skipped.
//!
//! Vocabulary:
//! - `APPROVED_VERIFIED` → approved, score = `similarity` (default 95)
//! - `DENIED_FRAUD`, `DENIED_UNSUPPORTED_ID_TYPE` → rejected, score 0
//! - anything else → in review

use serde_json::Value;

use verident_types::{VerificationOutcome, VerificationStatus};

use crate::error::AdapterError;
use crate::provider::Normalized;

/// Score Jumio reports when a scan is approved without a similarity figure.
const DEFAULT_APPROVED_SCORE: u8 = 95;

pub fn normalize(payload: &Value) -> Result<Normalized, AdapterError> {
    let external_id = payload
        .get("scanReference")
        .and_then(Value::as_str)
        .ok_or(AdapterError::MissingField {
            provider: "jumio",
            field: "scanReference",
        })?;

    let verdict = payload
        .get("verificationStatus")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let (status, score) = match verdict {
        "APPROVED_VERIFIED" => (
            VerificationStatus::Approved,
            similarity_score(payload).unwrap_or(DEFAULT_APPROVED_SCORE),
        ),
        "DENIED_FRAUD" | "DENIED_UNSUPPORTED_ID_TYPE" => (VerificationStatus::Rejected, 0),
        _ => (VerificationStatus::InReview, 0),
    };

    Ok(Normalized::Outcome(VerificationOutcome::new(
        external_id,
        status,
        score,
    )))
}

fn similarity_score(payload: &Value) -> Option<u8> {
    payload
        .get("similarity")
        .and_then(Value::as_f64)
        .map(|s| s.clamp(0.0, 100.0) as u8)
}
