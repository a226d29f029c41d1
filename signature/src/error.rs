use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The supplied signature is not valid hex of the right length.
    /// Distinct from a clean mismatch, which is `Ok(false)`.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// No shared secret is configured for the named provider. This is a
    /// deployment error, never a verification bypass.
    #[error("no webhook secret configured for provider {0}")]
    MissingSecret(String),
}
