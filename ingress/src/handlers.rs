//! Webhook route handlers.
//!
//! Every KYC route reads the raw body bytes before any JSON parsing:
//! signatures are computed over the exact bytes on the wire, and a
//! re-serialized body would not verify.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use verident_adapters::{Normalized, Provider};
use verident_engine::{
    ChainIngestor, DocumentIngestResult, DocumentIngestor, DocumentResults, ReconcileResult,
    Reconciler,
};
use verident_signature::{verify_signature, SecretRegistry};
use verident_types::{DocumentId, DocumentStatus, Timestamp};

use crate::error::IngressError;
use crate::metrics::IngressMetrics;

/// Everything the handlers need, shared across requests.
pub struct AppState {
    pub secrets: SecretRegistry,
    pub reconciler: Reconciler,
    pub chain: ChainIngestor,
    pub documents: DocumentIngestor,
    pub metrics: IngressMetrics,
}

/// Build the ingress router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/kyc/:provider", post(kyc_webhook))
        .route("/webhooks/blockchain/:network", post(blockchain_webhook))
        .route("/webhooks/documents/:provider", post(document_webhook))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// The acknowledgement body providers see. `success: false` with a 200 is
/// deliberate for unknown verifications: the record will never exist, so the
/// provider must stop retrying.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    fn applied(status: impl Into<String>) -> Self {
        Self {
            success: true,
            status: Some(status.into()),
            message: None,
        }
    }

    fn ignored() -> Self {
        Self {
            success: true,
            status: Some("ignored".to_string()),
            message: None,
        }
    }

    fn not_found() -> Self {
        Self {
            success: false,
            status: None,
            message: Some("Verification not found".to_string()),
        }
    }
}

// ── KYC providers ────────────────────────────────────────────────────────

async fn kyc_webhook(
    State(state): State<Arc<AppState>>,
    Path(provider_slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, IngressError> {
    state.metrics.kyc_received.inc();

    // Unknown slugs are acknowledged before authentication: there is no
    // secret to verify against and nothing to mutate.
    let Some(provider) = Provider::from_slug(&provider_slug) else {
        warn!(slug = %provider_slug, "webhook for unknown provider acknowledged");
        state.metrics.kyc_ignored.inc();
        return Ok(Json(WebhookResponse::ignored()));
    };

    let signature = signature_header(&headers).ok_or_else(|| {
        state.metrics.kyc_unauthorized.inc();
        IngressError::Unauthorized
    })?;
    let secret = state.secrets.resolve(provider.as_str())?;
    if !verify_signature(&body, signature, secret)? {
        state.metrics.kyc_unauthorized.inc();
        return Err(IngressError::Unauthorized);
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| IngressError::InvalidPayload(e.to_string()))?;

    let outcome = match provider
        .normalize(&payload)
        .map_err(|e| IngressError::InvalidPayload(e.to_string()))?
    {
        Normalized::Outcome(outcome) => outcome,
        Normalized::Skipped { event } => {
            info!(provider = %provider, event, "non-decision event acknowledged");
            state.metrics.kyc_ignored.inc();
            return Ok(Json(WebhookResponse::ignored()));
        }
    };

    let result =
        state
            .reconciler
            .reconcile(provider.as_str(), &outcome, &payload, Timestamp::now())?;

    Ok(Json(match result {
        ReconcileResult::Applied { status, .. } => {
            state.metrics.kyc_applied.inc();
            WebhookResponse::applied(status.to_string())
        }
        ReconcileResult::AlreadyApplied { status, .. } => {
            state.metrics.kyc_duplicate.inc();
            WebhookResponse::applied(status.to_string())
        }
        ReconcileResult::VerificationNotFound { .. } => {
            state.metrics.kyc_not_found.inc();
            WebhookResponse::not_found()
        }
    }))
}

/// Signature from `x-signature`, falling back to `authorization` for
/// providers that put the digest there.
fn signature_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-signature")
        .or_else(|| headers.get("authorization"))
        .and_then(|v| v.to_str().ok())
}

// ── Blockchain indexer ───────────────────────────────────────────────────

/// Events from the trusted chain indexer. No signature layer on this
/// channel; it must not be exposed on the public listener.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainWebhook {
    event: String,
    transaction_hash: String,
    #[serde(default)]
    data: Value,
}

async fn blockchain_webhook(
    State(state): State<Arc<AppState>>,
    Path(network): Path<String>,
    Json(webhook): Json<ChainWebhook>,
) -> Result<Json<WebhookResponse>, IngressError> {
    state.metrics.chain_received.inc();

    let result = state.chain.ingest(
        &network,
        &webhook.event,
        &webhook.transaction_hash,
        &webhook.data,
        Timestamp::now(),
    )?;

    use verident_engine::ChainIngestResult::*;
    Ok(Json(match result {
        IdentityAnchored { .. } => WebhookResponse::applied("anchored"),
        CredentialAnchored { .. } => WebhookResponse::applied("anchored"),
        CredentialRevoked { .. } => WebhookResponse::applied("revoked"),
        EntityNotFound { .. } => WebhookResponse::not_found(),
        Ignored { .. } => WebhookResponse::ignored(),
    }))
}

// ── Document processing ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentWebhook {
    document_id: String,
    status: DocumentStatus,
    #[serde(flatten)]
    results: DocumentResults,
}

async fn document_webhook(
    State(state): State<Arc<AppState>>,
    Path(_provider): Path<String>,
    Json(webhook): Json<DocumentWebhook>,
) -> Result<Json<WebhookResponse>, IngressError> {
    state.metrics.document_received.inc();

    let result = state.documents.ingest(
        &DocumentId::new(webhook.document_id),
        webhook.status,
        &webhook.results,
        Timestamp::now(),
    )?;

    Ok(Json(match result {
        DocumentIngestResult::Updated { .. } => {
            WebhookResponse::applied(webhook.status.to_string())
        }
        DocumentIngestResult::DocumentNotFound { .. } => WebhookResponse::not_found(),
    }))
}

// ── Operational endpoints ────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&state.metrics.registry.gather(), &mut buffer) {
        warn!(error = %e, "failed to encode metrics");
    }
    (
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
