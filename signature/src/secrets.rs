//! Per-provider shared secret registry.

use std::collections::HashMap;

use crate::error::SignatureError;

/// Maps provider slugs to their webhook shared secrets.
///
/// Resolution happens at verification time; a provider with no configured
/// secret is a fatal configuration error, not a silent bypass — the ingress
/// rejects the request and logs it.
#[derive(Clone, Debug, Default)]
pub struct SecretRegistry {
    secrets: HashMap<String, String>,
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(provider, secret)` pairs, e.g. a config
    /// file's `[secrets]` table.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            secrets: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, provider: impl Into<String>, secret: impl Into<String>) {
        self.secrets.insert(provider.into(), secret.into());
    }

    /// Resolve the shared secret for a provider.
    pub fn resolve(&self, provider: &str) -> Result<&[u8], SignatureError> {
        self.secrets
            .get(provider)
            .map(|s| s.as_bytes())
            .ok_or_else(|| SignatureError::MissingSecret(provider.to_string()))
    }

    /// Providers that have a secret configured.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(|k| k.as_str())
    }
}
