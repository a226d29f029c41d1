//! Provider identification and normalization dispatch.

use serde_json::Value;
use std::fmt;

use verident_types::VerificationOutcome;

use crate::error::AdapterError;
use crate::{jumio, onfido, sumsub, veriff};

/// The closed set of KYC providers this engine reconciles callbacks from.
///
/// Unknown provider slugs are not represented here — the ingress treats them
/// as acknowledged no-ops so newly onboarded providers can start delivering
/// before this enum learns about them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Jumio,
    Onfido,
    Sumsub,
    Veriff,
}

impl Provider {
    /// Resolve a URL path slug to a provider. Case-insensitive.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "jumio" => Some(Self::Jumio),
            "onfido" => Some(Self::Onfido),
            "sumsub" => Some(Self::Sumsub),
            "veriff" => Some(Self::Veriff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jumio => "jumio",
            Self::Onfido => "onfido",
            Self::Sumsub => "sumsub",
            Self::Veriff => "veriff",
        }
    }

    /// Normalize a raw webhook payload in this provider's vocabulary.
    pub fn normalize(&self, payload: &Value) -> Result<Normalized, AdapterError> {
        match self {
            Self::Jumio => jumio::normalize(payload),
            Self::Onfido => onfido::normalize(payload),
            Self::Sumsub => sumsub::normalize(payload),
            Self::Veriff => veriff::normalize(payload),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of normalizing one webhook payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// A completion event the reconciler should apply.
    Outcome(VerificationOutcome),
    /// An event type this engine does not reconcile on. Acknowledged without
    /// any entity mutation.
    Skipped {
        /// The provider's name for the event, for logging.
        event: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_slugs_resolve() {
        assert_eq!(Provider::from_slug("jumio"), Some(Provider::Jumio));
        assert_eq!(Provider::from_slug("Onfido"), Some(Provider::Onfido));
        assert_eq!(Provider::from_slug("SUMSUB"), Some(Provider::Sumsub));
        assert_eq!(Provider::from_slug("veriff"), Some(Provider::Veriff));
    }

    #[test]
    fn unknown_slug_is_none() {
        assert_eq!(Provider::from_slug("acme-kyc"), None);
        assert_eq!(Provider::from_slug(""), None);
    }

    #[test]
    fn slug_roundtrip() {
        for p in [
            Provider::Jumio,
            Provider::Onfido,
            Provider::Sumsub,
            Provider::Veriff,
        ] {
            assert_eq!(Provider::from_slug(p.as_str()), Some(p));
        }
    }
}
