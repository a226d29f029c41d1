//! Ingress error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use verident_engine::EngineError;
use verident_signature::SignatureError;

#[derive(Debug, Error)]
pub enum IngressError {
    /// Missing or invalid webhook signature. Never reveals which.
    #[error("unauthorized")]
    Unauthorized,

    /// Body is not the JSON shape the route expects.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// No shared secret configured for an otherwise-known provider. A
    /// deployment error, not a caller error.
    #[error("missing webhook secret for provider: {0}")]
    MissingSecret(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<SignatureError> for IngressError {
    fn from(e: SignatureError) -> Self {
        match e {
            // A signature we cannot even decode fails closed as unauthorized.
            SignatureError::MalformedSignature(_) => IngressError::Unauthorized,
            SignatureError::MissingSecret(provider) => IngressError::MissingSecret(provider),
        }
    }
}

impl IngressError {
    fn status(&self) -> StatusCode {
        match self {
            IngressError::Unauthorized => StatusCode::UNAUTHORIZED,
            IngressError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            IngressError::MissingSecret(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IngressError::Engine(e) => match e {
                // A malformed chain event is the indexer's bug, not ours.
                EngineError::InvalidChainEvent(_) => StatusCode::BAD_REQUEST,
                // Persistence problems are 5xx so the provider redelivers.
                EngineError::Store(_)
                | EngineError::RetriesExhausted(_)
                | EngineError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "webhook request failed");
        } else {
            warn!(error = %self, "webhook request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verident_store::StoreError;

    #[test]
    fn malformed_signature_maps_to_unauthorized() {
        let err: IngressError =
            SignatureError::MalformedSignature("not hex".to_string()).into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_secret_is_a_server_error() {
        let err: IngressError = SignatureError::MissingSecret("jumio".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_failure_is_a_server_error() {
        let err = IngressError::Engine(EngineError::Store(StoreError::Backend(
            "down".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_chain_event_is_a_client_error() {
        let err = IngressError::Engine(EngineError::InvalidChainEvent(
            "missing identityId".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
