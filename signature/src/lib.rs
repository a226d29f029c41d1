//! Webhook signature verification.
//!
//! Inbound provider callbacks are unauthenticated HTTP requests; nothing in
//! a payload is trusted until its signature has been checked against the
//! provider's shared secret. Signatures are HMAC-SHA256 over the *exact*
//! request body bytes — any re-serialization of parsed JSON would change the
//! bytes, so callers must verify before parsing.

pub mod error;
pub mod secrets;
pub mod verify;

pub use error::SignatureError;
pub use secrets::SecretRegistry;
pub use verify::{sign, verify_signature};
