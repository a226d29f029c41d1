//! Sumsub webhook normalization.
//!
//! Only `applicantReviewed` carries a verdict; applicant lifecycle events
//! (`applicantCreated`, `applicantPending`, ...) are skipped. The verdict
//! lives in `reviewResult.reviewStatus`: `completed` → approved (score 90),
//! `rejected` → rejected (score 0).

use serde_json::Value;

use verident_types::{VerificationOutcome, VerificationStatus};

use crate::error::AdapterError;
use crate::provider::Normalized;

const APPROVED_SCORE: u8 = 90;

pub fn normalize(payload: &Value) -> Result<Normalized, AdapterError> {
    let event = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if event != "applicantReviewed" {
        return Ok(Normalized::Skipped {
            event: event.to_string(),
        });
    }

    let external_id = payload
        .get("applicantId")
        .and_then(Value::as_str)
        .ok_or(AdapterError::MissingField {
            provider: "sumsub",
            field: "applicantId",
        })?;

    let review_status = payload
        .get("reviewResult")
        .and_then(|r| r.get("reviewStatus"))
        .and_then(Value::as_str);

    let (status, score) = match review_status {
        Some("completed") => (VerificationStatus::Approved, APPROVED_SCORE),
        Some("rejected") => (VerificationStatus::Rejected, 0),
        _ => (VerificationStatus::InReview, 0),
    };

    Ok(Normalized::Outcome(VerificationOutcome::new(
        external_id,
        status,
        score,
    )))
}
