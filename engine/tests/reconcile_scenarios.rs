//! End-to-end reconciliation scenarios against the in-memory store.

use std::sync::Arc;
use std::thread;

use serde_json::json;

use verident_engine::{
    ActionRequest, AuditLogger, EngineError, PostVerificationDispatcher, ReconcileResult,
    Reconciler,
};
use verident_nullables::{FailingStore, NullClock};
use verident_store::{IdentityStore, VerificationStore};
use verident_store_memory::MemoryStore;
use verident_types::{
    Identity, IdentityId, IdentityStatus, Timestamp, Verification, VerificationId,
    VerificationLevel, VerificationOutcome, VerificationStatus,
};

fn outcome(external_id: &str, status: VerificationStatus, score: u8) -> VerificationOutcome {
    VerificationOutcome {
        external_id: external_id.to_string(),
        status,
        score,
    }
}

fn seed(store: &MemoryStore) {
    store
        .put_identity(&Identity::new(
            IdentityId::new("idn_1"),
            "org_1".to_string(),
            "usr_1".to_string(),
        ))
        .unwrap();
    store
        .put_verification(&Verification::new(
            VerificationId::new("ver_1"),
            IdentityId::new("idn_1"),
            "jumio",
            "abc123",
        ))
        .unwrap();
}

fn reconciler(
    store: Arc<MemoryStore>,
) -> (Reconciler, tokio::sync::mpsc::Receiver<ActionRequest>) {
    let (dispatcher, rx) = PostVerificationDispatcher::new(16);
    let reconciler = Reconciler::new(
        store.clone(),
        store.clone(),
        AuditLogger::new(store),
        Arc::new(dispatcher),
    );
    (reconciler, rx)
}

#[test]
fn approved_outcome_cascades_to_identity() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, mut rx) = reconciler(store.clone());

    let result = reconciler
        .reconcile(
            "jumio",
            &outcome("abc123", VerificationStatus::Approved, 97),
            &json!({ "verificationStatus": "APPROVED_VERIFIED" }),
            Timestamp::new(1_000),
        )
        .unwrap();

    assert_eq!(
        result,
        ReconcileResult::Applied {
            verification_id: VerificationId::new("ver_1"),
            identity_id: IdentityId::new("idn_1"),
            status: VerificationStatus::Approved,
        }
    );

    let verification = store
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::Approved);
    assert_eq!(verification.verification_score, 97);
    assert_eq!(verification.reviewed_at, Some(Timestamp::new(1_000)));
    assert!(verification.external_response.is_some());

    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity.status, IdentityStatus::Verified);
    assert_eq!(identity.verification_level, VerificationLevel::Enhanced);
    assert_eq!(identity.verified_at, Some(Timestamp::new(1_000)));
    assert_eq!(
        identity.current_verification,
        Some(VerificationId::new("ver_1"))
    );

    // Exactly one downstream action queued.
    let request = rx.try_recv().unwrap();
    assert_eq!(request.status, VerificationStatus::Approved);
    assert!(rx.try_recv().is_err());
}

#[test]
fn rejected_outcome_leaves_verification_level_unchanged() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, _rx) = reconciler(store.clone());

    reconciler
        .reconcile(
            "jumio",
            &outcome("abc123", VerificationStatus::Rejected, 0),
            &json!({ "verificationStatus": "DENIED_FRAUD" }),
            Timestamp::new(1_000),
        )
        .unwrap();

    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity.status, IdentityStatus::Rejected);
    assert_eq!(identity.verification_level, VerificationLevel::None);
    assert!(identity.verified_at.is_none());
}

#[test]
fn duplicate_terminal_delivery_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, mut rx) = reconciler(store.clone());

    let approved = outcome("abc123", VerificationStatus::Approved, 97);
    let payload = json!({ "verificationStatus": "APPROVED_VERIFIED" });
    let clock = NullClock::new(1_000);

    reconciler
        .reconcile("jumio", &approved, &payload, clock.now())
        .unwrap();
    let identity_before = store.get_identity(&IdentityId::new("idn_1")).unwrap();

    clock.advance(1_000);
    let result = reconciler
        .reconcile("jumio", &approved, &payload, clock.now())
        .unwrap();
    assert_eq!(
        result,
        ReconcileResult::AlreadyApplied {
            verification_id: VerificationId::new("ver_1"),
            status: VerificationStatus::Approved,
        }
    );

    // Redelivery changed nothing and queued nothing new.
    let identity_after = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity_after.version, identity_before.version);
    assert_eq!(identity_after.verified_at, Some(Timestamp::new(1_000)));
    rx.try_recv().unwrap();
    assert!(rx.try_recv().is_err());

    assert!(store
        .audit_entries()
        .iter()
        .any(|e| e.action == "verification.duplicate_ignored"));
}

#[test]
fn stale_in_review_callback_cannot_reopen_decided_verification() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, _rx) = reconciler(store.clone());

    reconciler
        .reconcile(
            "jumio",
            &outcome("abc123", VerificationStatus::Approved, 97),
            &json!({ "verificationStatus": "APPROVED_VERIFIED" }),
            Timestamp::new(1_000),
        )
        .unwrap();

    // A redelivered intermediate verdict arrives after the decision.
    let result = reconciler
        .reconcile(
            "jumio",
            &outcome("abc123", VerificationStatus::InReview, 0),
            &json!({ "verificationStatus": "PENDING" }),
            Timestamp::new(2_000),
        )
        .unwrap();
    assert_eq!(
        result,
        ReconcileResult::AlreadyApplied {
            verification_id: VerificationId::new("ver_1"),
            status: VerificationStatus::Approved,
        }
    );

    // The decision and its cascade are untouched.
    let verification = store
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::Approved);
    assert_eq!(verification.verification_score, 97);
    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity.status, IdentityStatus::Verified);
    assert_eq!(
        identity.current_verification,
        Some(VerificationId::new("ver_1"))
    );

    assert!(store
        .audit_entries()
        .iter()
        .any(|e| e.action == "verification.stale_ignored"));
}

#[test]
fn unknown_external_id_is_acknowledged_without_mutation() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, mut rx) = reconciler(store.clone());

    let result = reconciler
        .reconcile(
            "jumio",
            &outcome("never-seen", VerificationStatus::Approved, 97),
            &json!({}),
            Timestamp::new(1_000),
        )
        .unwrap();

    assert_eq!(
        result,
        ReconcileResult::VerificationNotFound {
            provider: "jumio".to_string(),
            external_id: "never-seen".to_string(),
        }
    );

    let verification = store
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::InReview);
    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity.status, IdentityStatus::PendingVerification);
    assert!(rx.try_recv().is_err());
    assert_eq!(store.audit_count(), 0);
}

#[test]
fn external_ids_are_scoped_per_provider() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, _rx) = reconciler(store.clone());

    // Same external id, different provider: no match.
    let result = reconciler
        .reconcile(
            "onfido",
            &outcome("abc123", VerificationStatus::Approved, 95),
            &json!({}),
            Timestamp::new(1_000),
        )
        .unwrap();
    assert!(matches!(
        result,
        ReconcileResult::VerificationNotFound { .. }
    ));
}

#[test]
fn racing_terminal_outcomes_leave_no_mixed_state() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (reconciler, _rx) = reconciler(store.clone());
    let reconciler = Arc::new(reconciler);

    let approve = {
        let reconciler = reconciler.clone();
        thread::spawn(move || {
            reconciler.reconcile(
                "jumio",
                &outcome("abc123", VerificationStatus::Approved, 97),
                &json!({ "verificationStatus": "APPROVED_VERIFIED" }),
                Timestamp::new(1_000),
            )
        })
    };
    let reject = {
        let reconciler = reconciler.clone();
        thread::spawn(move || {
            reconciler.reconcile(
                "jumio",
                &outcome("abc123", VerificationStatus::Rejected, 0),
                &json!({ "verificationStatus": "DENIED_FRAUD" }),
                Timestamp::new(1_000),
            )
        })
    };
    approve.join().unwrap().unwrap();
    reject.join().unwrap().unwrap();

    // Whichever committed last wins, and the identity agrees with the
    // verification in every interleaving.
    let verification = store
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    match verification.status {
        VerificationStatus::Approved => {
            assert_eq!(identity.status, IdentityStatus::Verified);
            assert_eq!(verification.verification_score, 97);
        }
        VerificationStatus::Rejected => {
            assert_eq!(identity.status, IdentityStatus::Rejected);
            assert_eq!(verification.verification_score, 0);
        }
        VerificationStatus::InReview => panic!("race lost both outcomes"),
    }
    assert_eq!(
        identity.current_verification,
        Some(VerificationId::new("ver_1"))
    );
}

#[test]
fn dispatch_lost_to_full_queue_is_requeued_on_redelivery() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let (dispatcher, mut rx) = PostVerificationDispatcher::new(1);
    let dispatcher = Arc::new(dispatcher);
    let reconciler = Reconciler::new(
        store.clone(),
        store.clone(),
        AuditLogger::new(store.clone()),
        dispatcher.clone(),
    );

    // An unrelated hand-off fills the single-slot queue.
    dispatcher
        .dispatch(ActionRequest {
            identity_id: IdentityId::new("idn_other"),
            verification_id: VerificationId::new("ver_other"),
            status: VerificationStatus::Approved,
        })
        .unwrap();

    let approved = outcome("abc123", VerificationStatus::Approved, 97);
    let payload = json!({ "verificationStatus": "APPROVED_VERIFIED" });

    // Reconciliation commits; the dispatch hand-off is dropped (logged).
    reconciler
        .reconcile("jumio", &approved, &payload, Timestamp::new(1_000))
        .unwrap();
    let identity = store.get_identity(&IdentityId::new("idn_1")).unwrap();
    assert_eq!(identity.status, IdentityStatus::Verified);
    assert_eq!(
        rx.try_recv().unwrap().verification_id,
        VerificationId::new("ver_other")
    );
    assert!(rx.try_recv().is_err());

    // The worker has drained the queue by the time the provider
    // redelivers; the duplicate path re-offers the lost action.
    let result = reconciler
        .reconcile("jumio", &approved, &payload, Timestamp::new(2_000))
        .unwrap();
    assert_eq!(
        result,
        ReconcileResult::AlreadyApplied {
            verification_id: VerificationId::new("ver_1"),
            status: VerificationStatus::Approved,
        }
    );
    assert_eq!(
        rx.try_recv().unwrap().verification_id,
        VerificationId::new("ver_1")
    );

    // Once queued, further redeliveries are dedupe no-ops.
    reconciler
        .reconcile("jumio", &approved, &payload, Timestamp::new(3_000))
        .unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn verification_persistence_failure_propagates() {
    let store = Arc::new(FailingStore::new());
    seed(store.inner());
    let (dispatcher, mut rx) = PostVerificationDispatcher::new(16);
    let reconciler = Reconciler::new(
        store.clone(),
        store.clone(),
        AuditLogger::new(store.clone()),
        Arc::new(dispatcher),
    );

    store.fail_verification_puts(true);
    let err = reconciler
        .reconcile(
            "jumio",
            &outcome("abc123", VerificationStatus::Approved, 97),
            &json!({}),
            Timestamp::new(1_000),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));

    // Nothing committed, nothing dispatched.
    let verification = store
        .inner()
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::InReview);
    assert!(rx.try_recv().is_err());
}

#[test]
fn interrupted_cascade_heals_on_redelivery() {
    let store = Arc::new(FailingStore::new());
    seed(store.inner());
    let (dispatcher, mut rx) = PostVerificationDispatcher::new(16);
    let reconciler = Reconciler::new(
        store.clone(),
        store.clone(),
        AuditLogger::new(store.clone()),
        Arc::new(dispatcher),
    );

    let approved = outcome("abc123", VerificationStatus::Approved, 97);
    let payload = json!({ "verificationStatus": "APPROVED_VERIFIED" });
    let clock = NullClock::new(1_000);

    // The verification write lands, the identity cascade fails.
    store.fail_identity_puts(true);
    let err = reconciler
        .reconcile("jumio", &approved, &payload, clock.now())
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));

    let verification = store
        .inner()
        .get_verification(&VerificationId::new("ver_1"))
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::Approved);
    let identity = store
        .inner()
        .get_identity(&IdentityId::new("idn_1"))
        .unwrap();
    assert_eq!(identity.status, IdentityStatus::PendingVerification);
    assert!(rx.try_recv().is_err());

    // The provider redelivers after the store recovers; the idempotency
    // guard repairs the missing cascade and fires the dispatch.
    store.fail_identity_puts(false);
    clock.advance(1_000);
    let result = reconciler
        .reconcile("jumio", &approved, &payload, clock.now())
        .unwrap();
    assert_eq!(
        result,
        ReconcileResult::AlreadyApplied {
            verification_id: VerificationId::new("ver_1"),
            status: VerificationStatus::Approved,
        }
    );

    let identity = store
        .inner()
        .get_identity(&IdentityId::new("idn_1"))
        .unwrap();
    assert_eq!(identity.status, IdentityStatus::Verified);
    assert_eq!(identity.verified_at, Some(Timestamp::new(2_000)));

    let request = rx.try_recv().unwrap();
    assert_eq!(request.verification_id, VerificationId::new("ver_1"));
    assert!(rx.try_recv().is_err());

    // A third delivery is a pure no-op.
    clock.advance(1_000);
    reconciler
        .reconcile("jumio", &approved, &payload, clock.now())
        .unwrap();
    assert!(rx.try_recv().is_err());
}
