//! Verification reconciliation.
//!
//! Applies a canonical provider outcome to the `Verification` it references
//! and cascades terminal results to the parent `Identity`. All of the
//! engine's correctness properties live here:
//!
//! - idempotency under provider retry storms (repeated identical terminal
//!   outcomes are no-ops),
//! - optimistic concurrency (losing writers re-read and retry rather than
//!   clobbering),
//! - commit-then-notify ordering (dispatch failures never roll back state),
//! - the `Verification`-before-`Identity` write order, with a cascade repair
//!   on redelivery so a crash between the two writes heals on retry.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use verident_store::{IdentityStore, StoreError, VerificationStore};
use verident_types::{
    EntityType, Identity, IdentityId, IdentityStatus, Timestamp, Verification, VerificationId,
    VerificationLevel, VerificationOutcome, VerificationStatus,
};

use crate::audit::AuditLogger;
use crate::dispatch::{ActionRequest, PostVerificationDispatcher};
use crate::error::EngineError;

/// Attempts per read-modify-write before giving up. Conflicts are rare
/// (a provider retry racing a legitimate second event), so a handful of
/// retries is plenty; the provider's own redelivery backs the rest.
const MAX_WRITE_ATTEMPTS: usize = 5;

/// The outcome of reconciling one webhook event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileResult {
    /// The outcome was applied and, if terminal, cascaded to the identity.
    Applied {
        verification_id: VerificationId,
        identity_id: IdentityId,
        status: VerificationStatus,
    },
    /// The verification is already terminal and this delivery changed
    /// nothing: either a repeat of the same terminal outcome or a stale
    /// non-terminal callback. Treated as success by the ingress.
    AlreadyApplied {
        verification_id: VerificationId,
        status: VerificationStatus,
    },
    /// No verification matches the external id. Acknowledged (not an error)
    /// so the provider stops retrying against a record that will never
    /// exist.
    VerificationNotFound {
        provider: String,
        external_id: String,
    },
}

/// Applies canonical outcomes to the verification state machine.
pub struct Reconciler {
    verifications: Arc<dyn VerificationStore>,
    identities: Arc<dyn IdentityStore>,
    audit: AuditLogger,
    dispatcher: Arc<PostVerificationDispatcher>,
}

impl Reconciler {
    pub fn new(
        verifications: Arc<dyn VerificationStore>,
        identities: Arc<dyn IdentityStore>,
        audit: AuditLogger,
        dispatcher: Arc<PostVerificationDispatcher>,
    ) -> Self {
        Self {
            verifications,
            identities,
            audit,
            dispatcher,
        }
    }

    /// Reconcile one canonical outcome against the store.
    ///
    /// Persistence failures propagate (the provider retries on 5xx);
    /// dispatch failures are logged and swallowed — the committed
    /// reconciliation must not be undone by a downstream notification
    /// problem.
    pub fn reconcile(
        &self,
        provider: &str,
        outcome: &VerificationOutcome,
        raw_payload: &Value,
        now: Timestamp,
    ) -> Result<ReconcileResult, EngineError> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let Some(mut verification) = self
                .verifications
                .find_by_external_id(provider, &outcome.external_id)?
            else {
                warn!(
                    provider,
                    external_id = %outcome.external_id,
                    "webhook references unknown verification"
                );
                return Ok(ReconcileResult::VerificationNotFound {
                    provider: provider.to_string(),
                    external_id: outcome.external_id.clone(),
                });
            };

            // Idempotency guard: a repeated delivery of the same terminal
            // outcome is a no-op, modulo cascade repair below.
            if verification.status.is_terminal() && verification.status == outcome.status {
                self.audit.record(
                    "verification.duplicate_ignored",
                    EntityType::Verification,
                    verification.id.as_str(),
                    None,
                    json!({
                        "provider": provider,
                        "externalVerificationId": outcome.external_id,
                        "status": verification.status.to_string(),
                    }),
                    now,
                )?;
                self.repair_cascade(&verification, now)?;
                return Ok(ReconcileResult::AlreadyApplied {
                    verification_id: verification.id.clone(),
                    status: verification.status,
                });
            }

            // A terminal status only ever moves to a *different* terminal
            // status (last committer wins). A stale or out-of-order
            // non-terminal callback must not reopen a decided verification:
            // the identity would keep pointing at it as approved/rejected.
            if verification.status.is_terminal() && !outcome.status.is_terminal() {
                warn!(
                    provider,
                    verification = %verification.id,
                    stored = %verification.status,
                    incoming = %outcome.status,
                    "stale non-terminal callback for decided verification ignored"
                );
                self.audit.record(
                    "verification.stale_ignored",
                    EntityType::Verification,
                    verification.id.as_str(),
                    None,
                    json!({
                        "provider": provider,
                        "externalVerificationId": outcome.external_id,
                        "storedStatus": verification.status.to_string(),
                        "incomingStatus": outcome.status.to_string(),
                    }),
                    now,
                )?;
                return Ok(ReconcileResult::AlreadyApplied {
                    verification_id: verification.id.clone(),
                    status: verification.status,
                });
            }

            verification.status = outcome.status;
            verification.verification_score = outcome.score;
            verification.external_response = Some(raw_payload.clone());
            verification.reviewed_at = Some(now);

            match self.verifications.put_verification(&verification) {
                Ok(()) => {
                    self.audit.record(
                        "verification.reconciled",
                        EntityType::Verification,
                        verification.id.as_str(),
                        None,
                        json!({
                            "provider": provider,
                            "externalVerificationId": outcome.external_id,
                            "status": outcome.status.to_string(),
                            "score": outcome.score,
                        }),
                        now,
                    )?;
                    info!(
                        provider,
                        verification = %verification.id,
                        status = %outcome.status,
                        "verification reconciled"
                    );

                    if outcome.status.is_terminal() {
                        self.cascade_identity(&verification.id, now)?;
                        self.dispatch_terminal(&verification);
                    }

                    return Ok(ReconcileResult::Applied {
                        verification_id: verification.id.clone(),
                        identity_id: verification.identity_id.clone(),
                        status: outcome.status,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(
                        attempt,
                        verification = %verification.id,
                        "lost verification write race, retrying"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(outcome.external_id.clone()))
    }

    /// Cascade a terminal verification result to the parent identity.
    /// Runs its own read-modify-write loop: the identity can be contended
    /// independently of the verification (chain anchoring, a racing second
    /// verification).
    fn cascade_identity(
        &self,
        verification_id: &VerificationId,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            // Re-read the verification so a cascade that lost a race applies
            // the latest committed outcome, not this caller's stale snapshot.
            let verification = self.verifications.get_verification(verification_id)?;
            let mut identity = self.identities.get_identity(&verification.identity_id)?;
            let from = identity.status;
            apply_cascade(&mut identity, &verification, now);

            match self.identities.put_identity(&identity) {
                Ok(()) => {
                    self.audit.record(
                        "identity.status_changed",
                        EntityType::Identity,
                        identity.id.as_str(),
                        None,
                        json!({
                            "from": from.to_string(),
                            "to": identity.status.to_string(),
                            "verificationId": verification.id.as_str(),
                        }),
                        now,
                    )?;
                    return Ok(());
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(attempt, identity = %identity.id, "lost identity write race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(verification_id.to_string()))
    }

    /// A verification write without its identity cascade is a recoverable
    /// inconsistency (crash or store failure between the two writes). When
    /// the provider redelivers and hits the idempotency guard, finish the
    /// cascade — unless a different verification has since taken ownership
    /// of the identity's status — and re-offer the terminal action to the
    /// dispatcher, which also recovers a hand-off lost to a full queue.
    fn repair_cascade(
        &self,
        verification: &Verification,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let identity = self.identities.get_identity(&verification.identity_id)?;
        if let Some(current) = &identity.current_verification {
            if current != &verification.id {
                return Ok(());
            }
        }

        let cascaded = match verification.status {
            VerificationStatus::Approved => {
                identity.status == IdentityStatus::Verified
                    && identity.current_verification.as_ref() == Some(&verification.id)
            }
            VerificationStatus::Rejected => {
                identity.status == IdentityStatus::Rejected
                    && identity.current_verification.as_ref() == Some(&verification.id)
            }
            VerificationStatus::InReview => true,
        };

        if !cascaded {
            warn!(
                verification = %verification.id,
                identity = %identity.id,
                "repairing missing identity cascade on redelivery"
            );
            self.cascade_identity(&verification.id, now)?;
        }

        // Re-queue the terminal action even when the cascade is intact: the
        // original hand-off may have been lost to a full queue. The
        // dispatcher dedupes on the tuple, so this is a no-op otherwise.
        self.dispatch_terminal(verification);
        Ok(())
    }

    /// Best-effort hand-off to the dispatch worker. The dispatcher dedupes
    /// on the tuple, so calling this again on a repair path stays
    /// exactly-once.
    fn dispatch_terminal(&self, verification: &Verification) {
        let request = ActionRequest {
            identity_id: verification.identity_id.clone(),
            verification_id: verification.id.clone(),
            status: verification.status,
        };
        if let Err(e) = self.dispatcher.dispatch(request) {
            warn!(
                verification = %verification.id,
                error = %e,
                "post-verification dispatch failed; state remains committed"
            );
        }
    }
}

/// The only place `Identity.status` is ever written from a verification
/// outcome.
fn apply_cascade(identity: &mut Identity, verification: &Verification, now: Timestamp) {
    match verification.status {
        VerificationStatus::Approved => {
            identity.status = IdentityStatus::Verified;
            identity.verification_level = VerificationLevel::Enhanced;
            identity.verified_at = Some(now);
            identity.current_verification = Some(verification.id.clone());
        }
        VerificationStatus::Rejected => {
            // Verification level is left unchanged on rejection.
            identity.status = IdentityStatus::Rejected;
            identity.current_verification = Some(verification.id.clone());
        }
        VerificationStatus::InReview => {}
    }
}
