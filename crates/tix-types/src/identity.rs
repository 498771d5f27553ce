use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of the party requesting a ticket.
///
/// A `RequesterId` is never empty or whitespace-only; the check happens once
/// at construction so downstream code never has to repeat it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequesterId(String);

impl RequesterId {
    /// Validate and wrap a raw requester id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TypeError::EmptyRequesterId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RequesterId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RequesterId> for String {
    fn from(id: RequesterId) -> Self {
        id.0
    }
}

impl fmt::Debug for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequesterId({})", self.0)
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a booking.
///
/// Issued by [`BookingIdGenerator`]; the format is
/// `BOOK-<requester>-<unix_nanos>-<seq>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingId(String);

impl BookingId {
    /// Wrap an existing booking id (e.g. one received from a client).
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TypeError::EmptyBookingId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BookingId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<BookingId> for String {
    fn from(id: BookingId) -> Self {
        id.0
    }
}

impl fmt::Debug for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookingId({})", self.0)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static GLOBAL_GENERATOR: BookingIdGenerator = BookingIdGenerator::new();

/// Source of process-unique booking ids.
///
/// The wall-clock component only aids readability. Uniqueness comes from the
/// sequence number, which is strictly increasing for the generator's lifetime.
#[derive(Debug)]
pub struct BookingIdGenerator {
    seq: AtomicU64,
}

impl BookingIdGenerator {
    pub const fn new() -> Self {
        Self {
            seq: AtomicU64::new(1),
        }
    }

    /// The process-wide generator. Engines share it so ids stay unique even
    /// across independently constructed engines.
    pub fn global() -> &'static Self {
        &GLOBAL_GENERATOR
    }

    /// Issue the next booking id for `requester`.
    pub fn next_id(&self, requester: &RequesterId) -> BookingId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        BookingId(format!("BOOK-{}-{nanos}-{seq}", requester.as_str()))
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.seq.load(Ordering::Relaxed) - 1
    }
}

impl Default for BookingIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
