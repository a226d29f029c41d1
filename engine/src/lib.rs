//! The reconciliation engine.
//!
//! Folds asynchronous, already-authenticated provider callbacks into the
//! internal verification state machine:
//!
//! - [`Reconciler`] applies canonical outcomes to `Verification` records and
//!   cascades terminal results to the parent `Identity`.
//! - [`PostVerificationDispatcher`] hands terminal transitions to a worker
//!   that fires downstream actions exactly once per
//!   `(identity, verification, status)` tuple.
//! - [`ChainIngestor`] anchors on-chain identity/credential events.
//! - [`DocumentIngestor`] folds OCR/analysis results into documents and
//!   re-checks whether the owning verification is ready to complete.
//! - [`AuditLogger`] appends one immutable entry after every mutation above.
//!
//! Ordering contract: state is committed first, downstream effects are
//! best-effort afterwards. A dispatcher failure never rolls back a committed
//! reconciliation; a persistence failure propagates so the provider retries.

pub mod audit;
pub mod chain;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod reconcile;

pub use audit::AuditLogger;
pub use chain::{ChainEvent, ChainIngestResult, ChainIngestor};
pub use dispatch::{
    run_dispatch_worker, ActionRequest, DispatchOutcome, HttpActionTrigger,
    PostVerificationDispatcher,
};
pub use document::{DocumentIngestResult, DocumentIngestor, DocumentResults};
pub use error::EngineError;
pub use reconcile::{ReconcileResult, Reconciler};
