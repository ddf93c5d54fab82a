use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid snippet id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },
}

/// Convenience type alias for type operations.
pub type Result<T> = std::result::Result<T, TypesError>;
