//! HTTP ingress for provider webhooks.
//!
//! Terminates the three inbound channels — KYC provider callbacks
//! (HMAC-authenticated), blockchain indexer events, and document processing
//! results — and maps engine results onto provider-friendly HTTP semantics:
//! unknown records and duplicate deliveries are acknowledged with 200 so
//! providers stop retrying, while persistence failures surface as 5xx so
//! they retry.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::IngressError;
pub use handlers::{router, AppState, WebhookResponse};
pub use metrics::IngressMetrics;
pub use server::WebhookServer;
