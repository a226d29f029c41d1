//! Provider adapters — one pure normalizer per KYC provider.
//!
//! Each provider delivers webhooks in its own vocabulary. The adapters
//! translate those payloads into one canonical
//! [`VerificationOutcome`](verident_types::VerificationOutcome) so that
//! everything downstream is provider-agnostic. Adapters are pure transforms
//! of `payload -> outcome`: they never touch the store and are unit-testable
//! in isolation.
//!
//! Events outside a provider's completion set (session started, document
//! uploaded, intermediate statuses) normalize to [`Normalized::Skipped`];
//! the ingress acknowledges them without any entity mutation.

pub mod error;
pub mod jumio;
pub mod onfido;
pub mod provider;
pub mod sumsub;
pub mod veriff;

pub use error::AdapterError;
pub use provider::{Normalized, Provider};
