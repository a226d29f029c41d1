//! Prometheus metrics for the webhook ingress.
//!
//! [`IngressMetrics`] owns a dedicated [`Registry`] that the `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

/// Central collection of ingress-level Prometheus metrics.
pub struct IngressMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Total KYC webhook requests received, before any validation.
    pub kyc_received: IntCounter,
    /// KYC requests rejected for a missing or invalid signature.
    pub kyc_unauthorized: IntCounter,
    /// Outcomes applied to a verification (including cascades).
    pub kyc_applied: IntCounter,
    /// Duplicate terminal deliveries ignored.
    pub kyc_duplicate: IntCounter,
    /// Events ignored: unknown provider slug or non-decision event type.
    pub kyc_ignored: IntCounter,
    /// Webhooks referencing a verification we do not hold.
    pub kyc_not_found: IntCounter,
    /// Blockchain indexer events received.
    pub chain_received: IntCounter,
    /// Document processing events received.
    pub document_received: IntCounter,
}

impl IngressMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let kyc_received = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_webhooks_received_total",
                "Total KYC webhooks received"
            ),
            registry
        )
        .expect("failed to register kyc_received counter");

        let kyc_unauthorized = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_webhooks_unauthorized_total",
                "KYC webhooks rejected for a bad signature"
            ),
            registry
        )
        .expect("failed to register kyc_unauthorized counter");

        let kyc_applied = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_outcomes_applied_total",
                "Verification outcomes applied"
            ),
            registry
        )
        .expect("failed to register kyc_applied counter");

        let kyc_duplicate = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_duplicates_ignored_total",
                "Duplicate terminal deliveries ignored"
            ),
            registry
        )
        .expect("failed to register kyc_duplicate counter");

        let kyc_ignored = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_events_ignored_total",
                "KYC events ignored (unknown provider or event type)"
            ),
            registry
        )
        .expect("failed to register kyc_ignored counter");

        let kyc_not_found = register_int_counter_with_registry!(
            Opts::new(
                "verident_kyc_verification_not_found_total",
                "KYC webhooks referencing an unknown verification"
            ),
            registry
        )
        .expect("failed to register kyc_not_found counter");

        let chain_received = register_int_counter_with_registry!(
            Opts::new(
                "verident_chain_events_received_total",
                "Blockchain indexer events received"
            ),
            registry
        )
        .expect("failed to register chain_received counter");

        let document_received = register_int_counter_with_registry!(
            Opts::new(
                "verident_document_events_received_total",
                "Document processing events received"
            ),
            registry
        )
        .expect("failed to register document_received counter");

        Self {
            registry,
            kyc_received,
            kyc_unauthorized,
            kyc_applied,
            kyc_duplicate,
            kyc_ignored,
            kyc_not_found,
            chain_received,
            document_received,
        }
    }
}

impl Default for IngressMetrics {
    fn default() -> Self {
        Self::new()
    }
}
