use tix_types::BookingId;

/// Errors from booking store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A booking with this id is already stored.
    #[error("booking already exists: {0}")]
    DuplicateId(BookingId),

    /// The backend could not accept the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
