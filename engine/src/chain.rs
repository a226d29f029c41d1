//! Blockchain event ingestion.
//!
//! A trusted indexer delivers on-chain confirmation events (identity
//! anchored, credential issued or revoked). Handlers write chain metadata
//! onto the referenced entity, persist, and append an audit entry. There is
//! no signature layer on this channel; if it is ever exposed over public
//! HTTP an equivalent trust boundary must be added in front.
//!
//! Unrecognized event names are accepted and logged as no-ops so indexers
//! can emit new event types before this engine learns about them.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use verident_store::{CredentialStore, IdentityStore, StoreError};
use verident_types::{
    CredentialId, CredentialStatus, EntityType, IdentityId, Timestamp,
};

use crate::audit::AuditLogger;
use crate::error::EngineError;

const MAX_WRITE_ATTEMPTS: usize = 5;

/// The on-chain events this engine reconciles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    IdentityCreated,
    CredentialIssued,
    CredentialRevoked,
}

impl ChainEvent {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "IdentityCreated" => Some(Self::IdentityCreated),
            "CredentialIssued" => Some(Self::CredentialIssued),
            "CredentialRevoked" => Some(Self::CredentialRevoked),
            _ => None,
        }
    }
}

/// The outcome of ingesting one chain event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainIngestResult {
    IdentityAnchored { identity_id: IdentityId },
    CredentialAnchored { credential_id: CredentialId },
    CredentialRevoked { credential_id: CredentialId },
    /// The referenced entity does not exist. Acknowledged and logged.
    EntityNotFound { entity_id: String },
    /// Unrecognized event name; accepted as a no-op.
    Ignored { event: String },
}

/// Folds indexer events into identity/credential chain metadata.
pub struct ChainIngestor {
    identities: Arc<dyn IdentityStore>,
    credentials: Arc<dyn CredentialStore>,
    audit: AuditLogger,
}

impl ChainIngestor {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        credentials: Arc<dyn CredentialStore>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            identities,
            credentials,
            audit,
        }
    }

    pub fn ingest(
        &self,
        network: &str,
        event: &str,
        tx_hash: &str,
        data: &Value,
        now: Timestamp,
    ) -> Result<ChainIngestResult, EngineError> {
        let Some(event) = ChainEvent::parse(event) else {
            debug!(network, event, "unrecognized chain event accepted as no-op");
            return Ok(ChainIngestResult::Ignored {
                event: event.to_string(),
            });
        };

        match event {
            ChainEvent::IdentityCreated => self.anchor_identity(network, tx_hash, data, now),
            ChainEvent::CredentialIssued => self.anchor_credential(network, tx_hash, data, now),
            ChainEvent::CredentialRevoked => self.revoke_credential(network, tx_hash, data, now),
        }
    }

    fn anchor_identity(
        &self,
        network: &str,
        tx_hash: &str,
        data: &Value,
        now: Timestamp,
    ) -> Result<ChainIngestResult, EngineError> {
        let identity_id = IdentityId::new(required_str(data, "identityId")?);

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut identity = match self.identities.get_identity(&identity_id) {
                Ok(identity) => identity,
                Err(StoreError::NotFound(id)) => {
                    warn!(identity = %id, "IdentityCreated event references unknown identity");
                    return Ok(ChainIngestResult::EntityNotFound { entity_id: id });
                }
                Err(e) => return Err(e.into()),
            };

            identity.blockchain_tx_hash = Some(tx_hash.to_string());
            identity.blockchain_network = Some(network.to_string());
            identity.token_id = opt_str(data, "tokenId");
            identity.blockchain_address = opt_str(data, "owner");

            match self.identities.put_identity(&identity) {
                Ok(()) => {
                    self.audit.record(
                        "identity.chain_anchored",
                        EntityType::Identity,
                        identity.id.as_str(),
                        None,
                        json!({
                            "network": network,
                            "transactionHash": tx_hash,
                            "tokenId": identity.token_id,
                        }),
                        now,
                    )?;
                    info!(identity = %identity.id, network, "identity anchored on chain");
                    return Ok(ChainIngestResult::IdentityAnchored {
                        identity_id: identity.id,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(identity_id.to_string()))
    }

    fn anchor_credential(
        &self,
        network: &str,
        tx_hash: &str,
        data: &Value,
        now: Timestamp,
    ) -> Result<ChainIngestResult, EngineError> {
        let credential_id = CredentialId::new(required_str(data, "credentialId")?);

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut credential = match self.credentials.get_credential(&credential_id) {
                Ok(credential) => credential,
                Err(StoreError::NotFound(id)) => {
                    warn!(credential = %id, "CredentialIssued event references unknown credential");
                    return Ok(ChainIngestResult::EntityNotFound { entity_id: id });
                }
                Err(e) => return Err(e.into()),
            };

            credential.blockchain_tx_hash = Some(tx_hash.to_string());
            credential.blockchain_network = Some(network.to_string());
            credential.token_id = opt_str(data, "tokenId");

            match self.credentials.put_credential(&credential) {
                Ok(()) => {
                    self.audit.record(
                        "credential.chain_anchored",
                        EntityType::VerifiableCredential,
                        credential.id.as_str(),
                        None,
                        json!({
                            "network": network,
                            "transactionHash": tx_hash,
                            "tokenId": credential.token_id,
                        }),
                        now,
                    )?;
                    info!(credential = %credential.id, network, "credential anchored on chain");
                    return Ok(ChainIngestResult::CredentialAnchored {
                        credential_id: credential.id,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(credential_id.to_string()))
    }

    fn revoke_credential(
        &self,
        network: &str,
        tx_hash: &str,
        data: &Value,
        now: Timestamp,
    ) -> Result<ChainIngestResult, EngineError> {
        let credential_id = CredentialId::new(required_str(data, "credentialId")?);

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut credential = match self.credentials.get_credential(&credential_id) {
                Ok(credential) => credential,
                Err(StoreError::NotFound(id)) => {
                    warn!(credential = %id, "CredentialRevoked event references unknown credential");
                    return Ok(ChainIngestResult::EntityNotFound { entity_id: id });
                }
                Err(e) => return Err(e.into()),
            };

            credential.status = CredentialStatus::Revoked;
            credential.revoked_at = Some(now);
            credential.revocation_reason = opt_str(data, "reason");
            credential.blockchain_tx_hash = Some(tx_hash.to_string());
            credential.blockchain_network = Some(network.to_string());

            match self.credentials.put_credential(&credential) {
                Ok(()) => {
                    self.audit.record(
                        "credential.revoked",
                        EntityType::VerifiableCredential,
                        credential.id.as_str(),
                        None,
                        json!({
                            "network": network,
                            "transactionHash": tx_hash,
                            "reason": credential.revocation_reason,
                        }),
                        now,
                    )?;
                    info!(credential = %credential.id, network, "credential revoked on chain");
                    return Ok(ChainIngestResult::CredentialRevoked {
                        credential_id: credential.id,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RetriesExhausted(credential_id.to_string()))
    }
}

fn required_str<'a>(data: &'a Value, field: &str) -> Result<&'a str, EngineError> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::InvalidChainEvent(format!("missing {field}")))
}

fn opt_str(data: &Value, field: &str) -> Option<String> {
    data.get(field).and_then(Value::as_str).map(str::to_string)
}
