use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::BookingId;

/// Outcome of a single allocation attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// A ticket was consumed and recorded under this booking id.
    Success(BookingId),
    /// No tickets remained at decision time.
    SoldOut,
    /// The requester id was empty or whitespace-only.
    InvalidInput,
    /// The booking could not be persisted; no ticket was consumed.
    StorageError(String),
    /// The attempt was abandoned before it could complete.
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn booking_id(&self) -> Option<&BookingId> {
        match self {
            Self::Success(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(id) => write!(f, "booked {id}"),
            Self::SoldOut => f.write_str("no tickets available"),
            Self::InvalidInput => f.write_str("invalid user ID"),
            Self::StorageError(reason) => write!(f, "storage error: {reason}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// An [`Outcome`] paired with the raw requester id that produced it.
///
/// The requester id is kept as the raw string so that rejected input can be
/// reported back verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub requester_id: String,
    pub outcome: Outcome,
}

impl AllocationResult {
    pub fn new(requester_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            requester_id: requester_id.into(),
            outcome,
        }
    }
}
