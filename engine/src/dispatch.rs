//! Post-verification dispatch.
//!
//! A terminal verification transition triggers downstream work (credential
//! issuance eligibility, user notification). That work must happen exactly
//! once per `(identity, verification, status)` tuple and must not couple
//! provider-facing webhook latency to downstream latency, so accepted
//! requests are queued on a bounded channel and delivered by a worker task.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use verident_types::{IdentityId, VerificationId, VerificationStatus};

use crate::error::EngineError;

/// The named-action invocation payload for a terminal transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub identity_id: IdentityId,
    pub verification_id: VerificationId,
    pub status: VerificationStatus,
}

/// What the dispatcher did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queued for the worker; the tuple had not been seen before.
    Queued,
    /// The tuple was already dispatched; nothing was queued.
    Duplicate,
}

/// Deduplicating front of the dispatch pipeline.
///
/// Safe to invoke more than once for the same tuple: repeats are recorded
/// no-ops. The dedupe set is held in-process rather than read back from the
/// audit trail, which is write-only to this subsystem.
pub struct PostVerificationDispatcher {
    /// Grows with the number of terminal transitions (at most two tuples
    /// per verification) and is only trimmed by process restart.
    seen: Mutex<HashSet<(IdentityId, VerificationId, VerificationStatus)>>,
    tx: mpsc::Sender<ActionRequest>,
}

impl PostVerificationDispatcher {
    /// Create a dispatcher and the receiver its worker consumes.
    pub fn new(queue_depth: usize) -> (Self, mpsc::Receiver<ActionRequest>) {
        let (tx, rx) = mpsc::channel(queue_depth);
        (
            Self {
                seen: Mutex::new(HashSet::new()),
                tx,
            },
            rx,
        )
    }

    /// Queue a terminal transition for downstream delivery.
    ///
    /// The tuple is marked seen only once the queue accepts it, so a failed
    /// hand-off can be retried by the provider's redelivery.
    pub fn dispatch(&self, request: ActionRequest) -> Result<DispatchOutcome, EngineError> {
        let key = (
            request.identity_id.clone(),
            request.verification_id.clone(),
            request.status,
        );

        let mut seen = self.seen.lock().unwrap();
        if seen.contains(&key) {
            debug!(
                identity = %request.identity_id,
                verification = %request.verification_id,
                status = %request.status,
                "duplicate post-verification dispatch ignored"
            );
            return Ok(DispatchOutcome::Duplicate);
        }

        self.tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                EngineError::Dispatch("dispatch queue full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                EngineError::Dispatch("dispatch worker stopped".to_string())
            }
        })?;
        seen.insert(key);
        Ok(DispatchOutcome::Queued)
    }
}

/// Invokes the configured downstream action over HTTP (a cloud-function
/// style named-action endpoint).
pub struct HttpActionTrigger {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpActionTrigger {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn invoke(&self, request: &ActionRequest) -> Result<(), EngineError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Dispatch(format!(
                "action endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Worker loop: drains the dispatch queue and invokes the trigger.
///
/// Trigger failures are logged and dropped — the reconciliation that queued
/// the request is already committed and must not be affected. Runs until the
/// dispatcher side of the channel is dropped.
pub async fn run_dispatch_worker(
    mut rx: mpsc::Receiver<ActionRequest>,
    trigger: Option<HttpActionTrigger>,
) {
    while let Some(request) = rx.recv().await {
        match &trigger {
            Some(trigger) => match trigger.invoke(&request).await {
                Ok(()) => info!(
                    identity = %request.identity_id,
                    verification = %request.verification_id,
                    status = %request.status,
                    "post-verification action delivered"
                ),
                Err(e) => warn!(
                    identity = %request.identity_id,
                    verification = %request.verification_id,
                    error = %e,
                    "post-verification action failed"
                ),
            },
            None => debug!(
                identity = %request.identity_id,
                verification = %request.verification_id,
                status = %request.status,
                "no action endpoint configured; post-verification action dropped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: VerificationStatus) -> ActionRequest {
        ActionRequest {
            identity_id: IdentityId::new("idn_1"),
            verification_id: VerificationId::new("ver_1"),
            status,
        }
    }

    #[test]
    fn first_dispatch_queues_second_is_duplicate() {
        let (dispatcher, mut rx) = PostVerificationDispatcher::new(8);

        let outcome = dispatcher
            .dispatch(request(VerificationStatus::Approved))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Queued);

        let outcome = dispatcher
            .dispatch(request(VerificationStatus::Approved))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Duplicate);

        // Exactly one request reached the queue.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn different_statuses_are_distinct_tuples() {
        let (dispatcher, mut rx) = PostVerificationDispatcher::new(8);

        dispatcher
            .dispatch(request(VerificationStatus::Approved))
            .unwrap();
        let outcome = dispatcher
            .dispatch(request(VerificationStatus::Rejected))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Queued);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn full_queue_fails_without_marking_seen() {
        let (dispatcher, mut rx) = PostVerificationDispatcher::new(1);

        dispatcher
            .dispatch(request(VerificationStatus::Approved))
            .unwrap();

        let other = ActionRequest {
            identity_id: IdentityId::new("idn_2"),
            verification_id: VerificationId::new("ver_2"),
            status: VerificationStatus::Approved,
        };
        let err = dispatcher.dispatch(other.clone()).unwrap_err();
        assert!(matches!(err, EngineError::Dispatch(_)));

        // Not marked seen: once the queue drains, a retry goes through.
        rx.try_recv().unwrap();
        assert_eq!(dispatcher.dispatch(other).unwrap(), DispatchOutcome::Queued);
    }

    #[test]
    fn action_request_serializes_camel_case() {
        let json = serde_json::to_value(request(VerificationStatus::Approved)).unwrap();
        assert_eq!(json["identityId"], "idn_1");
        assert_eq!(json["verificationId"], "ver_1");
        assert_eq!(json["status"], "approved");
    }
}
