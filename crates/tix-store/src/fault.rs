use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tix_types::{Booking, BookingId, RequesterId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::BookingStore;

/// Store wrapper that fails selected `create` calls.
///
/// Reads and deletes always pass through to the inner store, so rollback of
/// a failed transaction can still be observed.
pub struct FaultInjectingStore<S> {
    inner: S,
    writes: AtomicU64,
    fail_on: AtomicU64,
    fail_all: AtomicBool,
}

impl<S: BookingStore> FaultInjectingStore<S> {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: AtomicU64::new(0),
            fail_on: AtomicU64::new(0),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Fail the `n`-th `create` call (1-based, counted from construction).
    /// `0` disarms.
    pub fn fail_on_write(self, n: u64) -> Self {
        self.fail_on.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every subsequent `create` call.
    pub fn fail_all_writes(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Stop failing writes.
    pub fn heal(&self) {
        self.fail_all.store(false, Ordering::SeqCst);
        self.fail_on.store(0, Ordering::SeqCst);
    }

    /// Number of `create` calls seen, failed ones included.
    pub fn write_attempts(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: BookingStore> BookingStore for FaultInjectingStore<S> {
    fn create(&self, booking: &Booking) -> StoreResult<()> {
        let attempt = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_all.load(Ordering::SeqCst) || self.fail_on.load(Ordering::SeqCst) == attempt {
            debug!(attempt, id = %booking.id, "injected booking write failure");
            return Err(StoreError::Unavailable(format!(
                "injected failure on write {attempt}"
            )));
        }
        self.inner.create(booking)
    }

    fn get(&self, id: &BookingId) -> StoreResult<Option<Booking>> {
        self.inner.get(id)
    }

    fn get_by_requester(&self, requester: &RequesterId) -> StoreResult<Vec<Booking>> {
        self.inner.get_by_requester(requester)
    }

    fn delete(&self, id: &BookingId) -> StoreResult<bool> {
        self.inner.delete(id)
    }

    fn count(&self) -> StoreResult<u64> {
        self.inner.count()
    }

    fn all(&self) -> StoreResult<Vec<Booking>> {
        self.inner.all()
    }
}
