use thiserror::Error;

use verident_store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A store write failed for a reason other than a version conflict.
    /// Propagates to the webhook caller as a 5xx so the provider retries.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Every read-modify-write attempt lost its version race. Bounded so a
    /// pathological interleaving cannot spin forever; the provider's retry
    /// gets a fresh set of attempts.
    #[error("optimistic write retries exhausted for {0}")]
    RetriesExhausted(String),

    /// Hand-off to the dispatch worker failed. Logged by the reconciler,
    /// never propagated to the webhook caller.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// A blockchain event payload is missing the entity id its handler
    /// keys on. The indexer channel is trusted, so this is a caller bug.
    #[error("invalid chain event: {0}")]
    InvalidChainEvent(String),
}
