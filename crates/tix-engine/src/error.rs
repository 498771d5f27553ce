use thiserror::Error;

/// Errors from engine queries. Allocation itself never errors: every failure
/// is an [`Outcome`](tix_types::Outcome).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] tix_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] tix_store::StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
