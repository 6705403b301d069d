use thiserror::Error;

/// Failure surfaced by a storage backend.
///
/// Backend failures are fatal to the in-flight call and propagate unmodified
/// through the ledger layer; retry policy belongs to the caller, typically
/// by re-running whole-block application.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found: {0}")]
    NotFound(String),

    #[error("uniqueness violated: {0}")]
    Duplicate(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("row could not be encoded or decoded: {0}")]
    Serialization(String),
}
