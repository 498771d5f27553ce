use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tix_types::{Booking, BookingId, RequesterId};

use crate::error::{StoreError, StoreResult};
use crate::traits::BookingStore;

/// In-memory, HashMap-based booking store.
///
/// Bookings live behind a `RwLock`: lookups share the lock, writes take it
/// exclusively. Records are cloned on read.
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty store pre-sized for `capacity` bookings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bookings: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<BookingId, Booking>>> {
        self.bookings.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<BookingId, Booking>>> {
        self.bookings.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore for InMemoryBookingStore {
    fn create(&self, booking: &Booking) -> StoreResult<()> {
        let mut map = self.write()?;
        match map.entry(booking.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(booking.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(booking.clone());
                Ok(())
            }
        }
    }

    fn get(&self, id: &BookingId) -> StoreResult<Option<Booking>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn get_by_requester(&self, requester: &RequesterId) -> StoreResult<Vec<Booking>> {
        let mut found: Vec<Booking> = self
            .read()?
            .values()
            .filter(|b| &b.requester_id == requester)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    fn delete(&self, id: &BookingId) -> StoreResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.len() as u64)
    }

    fn all(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.read()?.values().cloned().collect();
        bookings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }
}

impl std::fmt::Debug for InMemoryBookingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.count().unwrap_or_default();
        f.debug_struct("InMemoryBookingStore")
            .field("booking_count", &count)
            .finish()
    }
}
