use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// A processed event is missing a field the reconciler cannot proceed
    /// without (typically the external correlation id).
    #[error("{provider} payload missing required field {field}")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },
}
