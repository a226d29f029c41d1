use proptest::prelude::*;

use verident_types::{Timestamp, VerificationId, VerificationOutcome, VerificationStatus};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// elapsed_since never underflows, even for timestamps in the future.
    #[test]
    fn elapsed_since_saturates(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let elapsed = Timestamp::new(a).elapsed_since(Timestamp::new(b));
        prop_assert_eq!(elapsed, b.saturating_sub(a));
    }

    /// Id newtypes serialize as the bare string and roundtrip losslessly.
    #[test]
    fn verification_id_serde_roundtrip(s in "[a-zA-Z0-9_-]{1,40}") {
        let id = VerificationId::new(s.clone());
        let json = serde_json::to_string(&id).unwrap();
        prop_assert_eq!(json, format!("\"{s}\""));
        let back: VerificationId = serde_json::from_str(&format!("\"{s}\"")).unwrap();
        prop_assert_eq!(back.as_str(), s);
    }

    /// Canonical outcomes roundtrip through JSON unchanged.
    #[test]
    fn outcome_serde_roundtrip(ext in "[a-z0-9]{1,20}", score in 0u8..=100) {
        for status in [
            VerificationStatus::InReview,
            VerificationStatus::Approved,
            VerificationStatus::Rejected,
        ] {
            let outcome = VerificationOutcome::new(ext.clone(), status, score);
            let json = serde_json::to_string(&outcome).unwrap();
            let back: VerificationOutcome = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, outcome);
        }
    }
}
