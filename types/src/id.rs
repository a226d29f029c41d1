//! Id newtypes for the entities managed by the reconciliation engine.
//!
//! Ids are opaque strings assigned by the object store. Newtypes keep the
//! four entity id spaces from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Id of an [`Identity`](crate::Identity) record.
    IdentityId
);
string_id!(
    /// Id of a [`Verification`](crate::Verification) attempt.
    VerificationId
);
string_id!(
    /// Id of a [`VerificationDocument`](crate::VerificationDocument).
    DocumentId
);
string_id!(
    /// Id of a [`VerifiableCredential`](crate::VerifiableCredential).
    CredentialId
);
