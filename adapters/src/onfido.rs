//! Onfido webhook normalization.
//!
//! Onfido emits many event types over a check's lifetime; only
//! `check.completed` carries a verdict. Everything else (`check.started`,
//! report events, withdrawals) is skipped.
//!
//! Vocabulary for completed checks, keyed on `object.result`:
//! - `clear` → approved, score 95
//! - `consider`, `unidentified` → rejected, score 30
//! - anything else → in review

use serde_json::Value;

use verident_types::{VerificationOutcome, VerificationStatus};

use crate::error::AdapterError;
use crate::provider::Normalized;

const APPROVED_SCORE: u8 = 95;
/// A `consider`/`unidentified` result still found *something*; the low score
/// distinguishes it from a hard fraud rejection in downstream reporting.
const REJECTED_SCORE: u8 = 30;

pub fn normalize(payload: &Value) -> Result<Normalized, AdapterError> {
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if action != "check.completed" {
        return Ok(Normalized::Skipped {
            event: action.to_string(),
        });
    }

    let object = payload.get("object").unwrap_or(&Value::Null);
    let external_id =
        object
            .get("id")
            .and_then(Value::as_str)
            .ok_or(AdapterError::MissingField {
                provider: "onfido",
                field: "object.id",
            })?;

    let (status, score) = match object.get("result").and_then(Value::as_str) {
        Some("clear") => (VerificationStatus::Approved, APPROVED_SCORE),
        Some("consider") | Some("unidentified") => (VerificationStatus::Rejected, REJECTED_SCORE),
        _ => (VerificationStatus::InReview, 0),
    };

    Ok(Normalized::Outcome(VerificationOutcome::new(
        external_id,
        status,
        score,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed(result: &str) -> Value {
        json!({
            "resource_type": "check",
            "action": "check.completed",
            "object": { "id": "chk1", "status": "complete", "result": result },
        })
    }

    #[test]
    fn clear_result_is_approved() {
        match normalize(&completed("clear")).unwrap() {
            Normalized::Outcome(o) => {
                assert_eq!(o.external_id, "chk1");
                assert_eq!(o.status, VerificationStatus::Approved);
                assert_eq!(o.score, 95);
            }
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn consider_result_is_rejected_with_score_30() {
        match normalize(&completed("consider")).unwrap() {
            Normalized::Outcome(o) => {
                assert_eq!(o.status, VerificationStatus::Rejected);
                assert_eq!(o.score, 30);
            }
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn unidentified_result_is_rejected() {
        match normalize(&completed("unidentified")).unwrap() {
            Normalized::Outcome(o) => assert_eq!(o.status, VerificationStatus::Rejected),
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn unknown_result_stays_in_review() {
        match normalize(&completed("paused")).unwrap() {
            Normalized::Outcome(o) => assert_eq!(o.status, VerificationStatus::InReview),
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn non_completion_events_are_skipped() {
        let payload = json!({
            "resource_type": "check",
            "action": "check.started",
            "object": { "id": "chk1" },
        });
        assert_eq!(
            normalize(&payload).unwrap(),
            Normalized::Skipped {
                event: "check.started".to_string()
            }
        );
    }

    #[test]
    fn completed_check_without_id_is_an_error() {
        let payload = json!({
            "action": "check.completed",
            "object": { "result": "clear" },
        });
        assert!(matches!(
            normalize(&payload),
            Err(AdapterError::MissingField { field: "object.id", .. })
        ));
    }
}
