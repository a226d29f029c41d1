use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The caller's entity version does not match the stored version; a
    /// concurrent writer won. Retry the read-modify-write.
    #[error("version conflict on {entity}: expected {expected}, stored {stored}")]
    VersionConflict {
        entity: String,
        expected: u64,
        stored: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
