//! Veriff webhook normalization.
//!
//! Only decision events are processed: `verification.accepted` → approved
//! (score = provided `confidence`, default 85), `verification.declined` →
//! rejected (score 0). Session events (`verification.started`,
//! `verification.submitted`) are skipped.

use serde_json::Value;

use verident_types::{VerificationOutcome, VerificationStatus};

use crate::error::AdapterError;
use crate::provider::Normalized;

const DEFAULT_ACCEPTED_SCORE: u8 = 85;

pub fn normalize(payload: &Value) -> Result<Normalized, AdapterError> {
    let event = payload
        .get("event")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let status = match event {
        "verification.accepted" => VerificationStatus::Approved,
        "verification.declined" => VerificationStatus::Rejected,
        _ => {
            return Ok(Normalized::Skipped {
                event: event.to_string(),
            })
        }
    };

    let verification = payload.get("verification").unwrap_or(&Value::Null);
    let external_id =
        verification
            .get("id")
            .and_then(Value::as_str)
            .ok_or(AdapterError::MissingField {
                provider: "veriff",
                field: "verification.id",
            })?;

    let score = match status {
        VerificationStatus::Approved => confidence_score(verification),
        _ => 0,
    };

    Ok(Normalized::Outcome(VerificationOutcome::new(
        external_id,
        status,
        score,
    )))
}

fn confidence_score(verification: &Value) -> u8 {
    verification
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_ACCEPTED_SCORE)
}
