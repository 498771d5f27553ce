use thiserror::Error;

/// Errors from the dispatch pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The request queue is closed: `stop()` was called or every worker exited.
    #[error("dispatch pool is closed")]
    Closed,

    /// The pool's cancellation token fired before the request was queued.
    #[error("submission cancelled")]
    Cancelled,

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
