use thiserror::Error;

/// Errors produced by type construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("requester id must not be empty")]
    EmptyRequesterId,

    #[error("booking id must not be empty")]
    EmptyBookingId,
}
