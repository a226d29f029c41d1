//! Document processing ingestion.
//!
//! OCR/analysis services deliver per-document results. The ingestor merges
//! them onto the `VerificationDocument` (absent fields are left unchanged,
//! not zeroed) and, when a document reaches a terminal status, re-checks
//! whether the owning verification now has a complete, fully verified
//! document set.
//!
//! Readiness is necessary but not sufficient: a verification completes only
//! through a provider outcome in the reconciler, never from documents alone.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use verident_store::{DocumentStore, StoreError, VerificationStore};
use verident_types::{
    DocumentId, DocumentStatus, EntityType, Timestamp, VerificationId, VerificationStatus,
};

use crate::audit::AuditLogger;
use crate::error::EngineError;

const MAX_WRITE_ATTEMPTS: usize = 5;

/// Result fields delivered by the processing service. All optional: an
/// absent field leaves the stored value untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResults {
    pub ocr_data: Option<Value>,
    pub analysis_results: Option<Value>,
    pub verification_score: Option<u8>,
}

/// The outcome of ingesting one document-processing event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentIngestResult {
    Updated {
        document_id: DocumentId,
        /// Whether the owning verification's document set is now complete
        /// and fully verified.
        verification_ready: bool,
    },
    /// The referenced document does not exist. Acknowledged and logged.
    DocumentNotFound { document_id: DocumentId },
}

/// Folds processing results into documents and runs the completion check.
pub struct DocumentIngestor {
    documents: Arc<dyn DocumentStore>,
    verifications: Arc<dyn VerificationStore>,
    audit: AuditLogger,
}

impl DocumentIngestor {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        verifications: Arc<dyn VerificationStore>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            documents,
            verifications,
            audit,
        }
    }

    pub fn ingest(
        &self,
        document_id: &DocumentId,
        status: DocumentStatus,
        results: &DocumentResults,
        now: Timestamp,
    ) -> Result<DocumentIngestResult, EngineError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut document = match self.documents.get_document(document_id) {
                Ok(document) => document,
                Err(StoreError::NotFound(id)) => {
                    warn!(document = %id, "processing event references unknown document");
                    return Ok(DocumentIngestResult::DocumentNotFound {
                        document_id: document_id.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            document.status = status;
            if let Some(ocr) = &results.ocr_data {
                document.ocr_data = Some(ocr.clone());
            }
            if let Some(analysis) = &results.analysis_results {
                document.analysis_results = Some(analysis.clone());
            }
            if let Some(score) = results.verification_score {
                document.verification_score = Some(score);
            }
            document.processed_at = Some(now);

            match self.documents.put_document(&document) {
                Ok(()) => {
                    self.audit.record(
                        "document.processed",
                        EntityType::VerificationDocument,
                        document.id.as_str(),
                        None,
                        json!({
                            "status": status.to_string(),
                            "score": document.verification_score,
                        }),
                        now,
                    )?;
                    info!(document = %document.id, status = %status, "document processed");

                    let verification_ready = if status.is_terminal() {
                        self.check_completion(&document.verification_id, now)?
                    } else {
                        false
                    };

                    return Ok(DocumentIngestResult::Updated {
                        document_id: document.id,
                        verification_ready,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(document_id.to_string()))
    }

    /// A verification's documents are complete when at least one exists and
    /// every one is terminal and verified. Readiness is recorded in the
    /// audit trail; the verification's own status is untouched.
    fn check_completion(
        &self,
        verification_id: &VerificationId,
        now: Timestamp,
    ) -> Result<bool, EngineError> {
        let verification = match self.verifications.get_verification(verification_id) {
            Ok(verification) => verification,
            Err(StoreError::NotFound(id)) => {
                warn!(verification = %id, "document belongs to unknown verification");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        // An already-decided verification has nothing left to become ready for.
        if verification.status != VerificationStatus::InReview {
            return Ok(false);
        }

        let documents = self.documents.documents_for_verification(verification_id)?;
        let ready = !documents.is_empty()
            && documents
                .iter()
                .all(|d| d.status == DocumentStatus::Verified);

        if ready {
            self.audit.record(
                "verification.documents_complete",
                EntityType::Verification,
                verification.id.as_str(),
                None,
                json!({ "documentCount": documents.len() }),
                now,
            )?;
            info!(verification = %verification.id, "all documents verified");
        } else {
            debug!(verification = %verification.id, "document set not yet complete");
        }

        Ok(ready)
    }
}
