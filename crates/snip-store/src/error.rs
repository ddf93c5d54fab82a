//! Error types for snippet store operations.

use snip_types::TypesError;

/// Errors from snippet store operations.
///
/// [`StoreError::NotFound`] is the one absence signal shared by every backend,
/// so callers write a single check regardless of which store is active.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value has been stored under the requested id.
    #[error("snippet not found")]
    NotFound,

    /// The id violates a precondition of the store.
    #[error("invalid snippet id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// I/O error from the filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the remote datastore, passed through unchanged.
    #[error("datastore error: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Entity encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The call context was cancelled before the operation completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The call context's deadline passed before the operation completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid configuration or unsupported backend selection.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns `true` for the shared not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Wrap an arbitrary datastore client error.
    pub fn service(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Service(err.into())
    }
}

impl From<TypesError> for StoreError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::InvalidId { id, reason } => Self::InvalidId { id, reason },
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
