use tix_types::{Booking, BookingId, RequesterId};

use crate::error::StoreResult;

/// Keyed storage for booking records.
///
/// All implementations must satisfy these invariants:
/// - `create` fails with [`StoreError::DuplicateId`](crate::StoreError::DuplicateId)
///   if the id is present, and leaves the existing record untouched.
/// - Records returned by reads are exactly what was written.
/// - Operations are safe to call from many threads at once.
pub trait BookingStore: Send + Sync {
    /// Insert a new booking.
    fn create(&self, booking: &Booking) -> StoreResult<()>;

    /// Look up a booking by id. Returns `Ok(None)` if absent.
    fn get(&self, id: &BookingId) -> StoreResult<Option<Booking>>;

    /// All bookings held by `requester`, oldest first.
    fn get_by_requester(&self, requester: &RequesterId) -> StoreResult<Vec<Booking>>;

    /// Remove a booking. Returns `true` if it existed.
    ///
    /// Only for rolling back a booking created in the same transaction.
    fn delete(&self, id: &BookingId) -> StoreResult<bool>;

    /// Number of stored bookings.
    fn count(&self) -> StoreResult<u64>;

    /// Every stored booking, oldest first.
    fn all(&self) -> StoreResult<Vec<Booking>>;
}
