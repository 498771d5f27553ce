use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tix_ledger::TicketLedger;
use tix_store::BookingStore;
use tix_types::{Booking, BookingId, BookingIdGenerator, Outcome, RequesterId, Stats};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;

/// Ledger aggregates and booking count read under one transaction scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Audit {
    pub stats: Stats,
    pub bookings: u64,
}

impl Audit {
    /// `total - available == count(bookings)`.
    pub fn is_consistent(&self) -> bool {
        self.stats.booked == self.bookings
    }
}

/// Runs allocation transactions against a shared ledger and booking store.
pub struct AllocationEngine<S: ?Sized> {
    ledger: Arc<TicketLedger>,
    store: Arc<S>,
    ids: &'static BookingIdGenerator,
    config: EngineConfig,
}

impl<S: BookingStore + ?Sized> AllocationEngine<S> {
    pub fn new(ledger: Arc<TicketLedger>, store: Arc<S>) -> Self {
        Self::with_config(ledger, store, EngineConfig::default())
    }

    pub fn with_config(ledger: Arc<TicketLedger>, store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            ledger,
            store,
            ids: BookingIdGenerator::global(),
            config,
        }
    }

    pub fn ledger(&self) -> &Arc<TicketLedger> {
        &self.ledger
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Try to book one ticket for `requester_id`.
    ///
    /// Everything from the availability recheck to the reservation runs inside
    /// the ledger's transaction scope. `cancel` is honoured at every point
    /// where the call can wait; a cancelled attempt changes nothing.
    pub async fn allocate(&self, requester_id: &str, cancel: &CancellationToken) -> Outcome {
        let Ok(requester) = RequesterId::parse(requester_id) else {
            debug!(requester_id, "rejected blank requester id");
            return Outcome::InvalidInput;
        };

        if let Some(bound) = self.config.jitter_bound() {
            let pause = Duration::from_micros(rand::thread_rng().gen_range(0..=bound));
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Outcome::Cancelled,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        // Contention shortcut only: zero is final, anything else is rechecked.
        if self.ledger.available() == 0 {
            return Outcome::SoldOut;
        }

        let Some(txn) = self.ledger.begin_cancellable(cancel).await else {
            debug!(%requester, "cancelled while waiting for ledger");
            return Outcome::Cancelled;
        };

        if txn.available() == 0 {
            return Outcome::SoldOut;
        }

        let booking = Booking::new(self.ids.next_id(&requester), requester);
        if let Err(err) = self.store.create(&booking) {
            warn!(id = %booking.id, error = %err, "booking write failed; no ticket consumed");
            return Outcome::StorageError(err.to_string());
        }

        if !txn.try_reserve(1) {
            return match self.store.delete(&booking.id) {
                Ok(_) => {
                    warn!(id = %booking.id, "reservation failed after write; booking rolled back");
                    Outcome::SoldOut
                }
                Err(err) => {
                    error!(id = %booking.id, error = %err, "rollback of booking failed");
                    Outcome::StorageError(format!("rollback failed: {err}"))
                }
            };
        }

        drop(txn);
        debug!(id = %booking.id, "ticket booked");
        Outcome::Success(booking.id)
    }

    /// Ledger snapshot.
    pub fn stats(&self) -> Stats {
        self.ledger.stats()
    }

    /// All bookings held by `requester_id`, oldest first.
    pub fn bookings_for(&self, requester_id: &str) -> EngineResult<Vec<Booking>> {
        let requester = RequesterId::parse(requester_id)?;
        Ok(self.store.get_by_requester(&requester)?)
    }

    pub fn booking(&self, booking_id: &str) -> EngineResult<Option<Booking>> {
        let id = BookingId::parse(booking_id)?;
        Ok(self.store.get(&id)?)
    }

    /// Read stats and booking count with no transaction in flight.
    pub async fn audit(&self) -> EngineResult<Audit> {
        let _txn = self.ledger.begin().await;
        Ok(Audit {
            stats: self.ledger.stats(),
            bookings: self.store.count()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use tix_store::{FaultInjectingStore, InMemoryBookingStore, StoreResult};

    fn engine(total: u64) -> Arc<AllocationEngine<InMemoryBookingStore>> {
        Arc::new(AllocationEngine::new(
            Arc::new(TicketLedger::new(total)),
            Arc::new(InMemoryBookingStore::new()),
        ))
    }

    async fn run_concurrently<S: BookingStore + 'static>(
        engine: &Arc<AllocationEngine<S>>,
        requests: usize,
    ) -> Vec<Outcome> {
        let cancel = CancellationToken::new();
        let handles: Vec<_> = (0..requests)
            .map(|i| {
                let engine = Arc::clone(engine);
                let cancel = cancel.clone();
                tokio::spawn(async move { engine.allocate(&format!("USER-{i:06}"), &cancel).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(requests);
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        outcomes
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn ten_tickets_hundred_requesters() {
        let engine = engine(10);
        let outcomes = run_concurrently(&engine, 100).await;

        let successes = outcomes.iter().filter(|o| o.is_success()).count();
        let sold_out = outcomes.iter().filter(|o| **o == Outcome::SoldOut).count();
        assert_eq!(successes, 10);
        assert_eq!(sold_out, 90);
        assert_eq!(engine.stats().available, 0);
        assert_eq!(engine.store().count().unwrap(), 10);

        let ids: HashSet<_> = outcomes.iter().filter_map(Outcome::booking_id).collect();
        assert_eq!(ids.len(), 10);
        assert!(engine.audit().await.unwrap().is_consistent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn demand_far_above_supply_never_oversells() {
        let engine = engine(250);
        let outcomes = run_concurrently(&engine, 2_000).await;

        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 250);
        let audit = engine.audit().await.unwrap();
        assert_eq!(audit.stats.booked, 250);
        assert_eq!(audit.bookings, 250);
    }

    #[tokio::test]
    async fn empty_pool_is_sold_out_without_records() {
        let engine = engine(0);
        let cancel = CancellationToken::new();
        for i in 0..20 {
            assert_eq!(engine.allocate(&format!("u{i}"), &cancel).await, Outcome::SoldOut);
        }
        assert_eq!(engine.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_requester_is_invalid_and_changes_nothing() {
        let engine = engine(3);
        let cancel = CancellationToken::new();

        assert_eq!(engine.allocate("", &cancel).await, Outcome::InvalidInput);
        assert_eq!(engine.allocate("  ", &cancel).await, Outcome::InvalidInput);
        assert_eq!(engine.stats().available, 3);
        assert_eq!(engine.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_write_consumes_no_ticket() {
        let ledger = Arc::new(TicketLedger::new(5));
        let store = Arc::new(FaultInjectingStore::new(InMemoryBookingStore::new()).fail_on_write(3));
        let engine = AllocationEngine::new(Arc::clone(&ledger), Arc::clone(&store));
        let cancel = CancellationToken::new();

        assert!(engine.allocate("first", &cancel).await.is_success());
        assert!(engine.allocate("second", &cancel).await.is_success());

        let before = ledger.available();
        let outcome = engine.allocate("third", &cancel).await;
        assert!(matches!(outcome, Outcome::StorageError(_)));
        assert_eq!(ledger.available(), before);
        assert!(engine.bookings_for("third").unwrap().is_empty());

        assert!(engine.allocate("fourth", &cancel).await.is_success());
        assert!(engine.audit().await.unwrap().is_consistent());
    }

    /// Drains the ledger behind the engine's back during the write, so the
    /// reservation that follows fails.
    struct DrainingStore {
        inner: InMemoryBookingStore,
        ledger: Arc<TicketLedger>,
    }

    impl BookingStore for DrainingStore {
        fn create(&self, booking: &Booking) -> StoreResult<()> {
            self.inner.create(booking)?;
            let _ = self.ledger.try_reserve(self.ledger.available());
            Ok(())
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

    #[tokio::test]
    async fn failed_reservation_rolls_back_booking() {
        let ledger = Arc::new(TicketLedger::new(2));
        let store = Arc::new(DrainingStore {
            inner: InMemoryBookingStore::new(),
            ledger: Arc::clone(&ledger),
        });
        let engine = AllocationEngine::new(Arc::clone(&ledger), Arc::clone(&store));

        let outcome = engine.allocate("victim", &CancellationToken::new()).await;
        assert_eq!(outcome, Outcome::SoldOut);
        assert_eq!(store.count().unwrap(), 0);
        assert!(engine.bookings_for("victim").unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_while_waiting_for_ledger() {
        let engine = engine(4);
        let held = engine.ledger().begin().await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(engine.allocate("late", &cancel).await, Outcome::Cancelled);

        drop(held);
        assert_eq!(engine.stats().available, 4);
        assert_eq!(engine.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn cancelled_during_jitter() {
        let engine = AllocationEngine::with_config(
            Arc::new(TicketLedger::new(1)),
            Arc::new(InMemoryBookingStore::new()),
            EngineConfig::with_latency_jitter(Duration::from_secs(60)),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(engine.allocate("sleepy", &cancel).await, Outcome::Cancelled);
        assert_eq!(engine.stats().available, 1);
    }

    #[tokio::test]
    async fn bookings_are_queryable_by_requester_and_id() {
        let engine = engine(3);
        let cancel = CancellationToken::new();

        let Outcome::Success(first) = engine.allocate("alice", &cancel).await else {
            panic!("expected success");
        };
        engine.allocate("alice", &cancel).await;
        engine.allocate("bob", &cancel).await;

        assert_eq!(engine.bookings_for("alice").unwrap().len(), 2);
        let found = engine.booking(first.as_str()).unwrap().unwrap();
        assert_eq!(found.requester_id.as_str(), "alice");
        assert!(engine.bookings_for("").is_err());
    }
}
