//! Error types for store operations.

/// Errors produced by the store and the ordering engine.
///
/// Every operation is all-or-nothing: an error means the transaction
/// rolled back and no positions were shifted.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced list or item does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller-supplied position is out of range (below 1)
    #[error("invalid position {0}: positions are 1-based")]
    InvalidPosition(i64),

    /// Underlying SQLite failure
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, StoreError>;
