use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Authoritative total/available counters for the ticket pool.
///
/// The counters are atomics so the unguarded availability read never blocks.
/// Correctness-bearing decisions go through [`TicketLedger::try_reserve`],
/// which folds the check and the decrement into one compare-and-swap.
pub struct TicketLedger {
    total: AtomicU64,
    available: AtomicU64,
    txn: Mutex<()>,
}

impl TicketLedger {
    pub fn new(total: u64) -> Self {
        Self {
            total: AtomicU64::new(total),
            available: AtomicU64::new(total),
            txn: Mutex::new(()),
        }
    }

    /// Tickets not yet reserved.
    ///
    /// This is an unguarded read. A zero result is final until the next
    /// `reset`; a non-zero result proves nothing.
    pub fn available(&self) -> u64 {
        self.available.load(Ordering::Acquire)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Atomically take `n` tickets iff at least `n` remain.
    ///
    /// Returns `false` and leaves the counter untouched otherwise.
    pub fn try_reserve(&self, n: u64) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |available| {
                available.checked_sub(n)
            })
            .is_ok()
    }

    /// Enter the exclusive transaction scope.
    ///
    /// Only one [`LedgerTxn`] exists at a time; others wait here.
    pub async fn begin(&self) -> LedgerTxn<'_> {
        let guard = self.txn.lock().await;
        LedgerTxn {
            ledger: self,
            _guard: guard,
        }
    }

    /// Like [`TicketLedger::begin`], but gives up when `cancel` fires first.
    pub async fn begin_cancellable(&self, cancel: &CancellationToken) -> Option<LedgerTxn<'_>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            txn = self.begin() => Some(txn),
        }
    }

    /// Reset both counters to `total`.
    ///
    /// Waits for the transaction scope, so it is serialized against in-flight
    /// allocations. Bookings recorded before the reset are not touched; callers
    /// resetting a live ledger break the booking invariant and must clear the
    /// store themselves.
    pub async fn reset(&self, total: u64) {
        let _txn = self.begin().await;
        self.total.store(total, Ordering::Release);
        self.available.store(total, Ordering::Release);
        info!(total, "ticket ledger reset");
    }
}

impl Default for TicketLedger {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for TicketLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketLedger")
            .field("total", &self.total())
            .field("available", &self.available())
            .finish()
    }
}

/// The ledger's exclusive transaction scope. Released on drop.
pub struct LedgerTxn<'a> {
    ledger: &'a TicketLedger,
    _guard: MutexGuard<'a, ()>,
}

impl LedgerTxn<'_> {
    /// Availability as seen inside the scope.
    pub fn available(&self) -> u64 {
        self.ledger.available()
    }

    pub fn try_reserve(&self, n: u64) -> bool {
        self.ledger.try_reserve(n)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn try_reserve_takes_only_what_is_left() {
        let ledger = TicketLedger::new(3);
        assert!(ledger.try_reserve(2));
        assert!(!ledger.try_reserve(2));
        assert_eq!(ledger.available(), 1);
        assert!(ledger.try_reserve(1));
        assert!(!ledger.try_reserve(1));
        assert_eq!(ledger.available(), 0);
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn reserving_zero_is_a_no_op() {
        let ledger = TicketLedger::new(0);
        assert!(ledger.try_reserve(0));
        assert_eq!(ledger.available(), 0);
    }

    #[test]
    fn concurrent_reservations_never_oversell() {
        let ledger = Arc::new(TicketLedger::new(1_000));
        let granted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let granted = Arc::clone(&granted);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        if ledger.try_reserve(1) {
                            granted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(granted.load(Ordering::Relaxed), 1_000);
        assert_eq!(ledger.available(), 0);
    }

    #[tokio::test]
    async fn reset_restores_both_counters() {
        let ledger = TicketLedger::new(5);
        assert!(ledger.try_reserve(5));
        ledger.reset(8).await;
        assert_eq!(ledger.total(), 8);
        assert_eq!(ledger.available(), 8);
    }

    #[tokio::test]
    async fn transaction_scope_is_exclusive() {
        let ledger = Arc::new(TicketLedger::new(1));
        let txn = ledger.begin().await;

        let contender = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                let _txn = ledger.begin().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(txn);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn begin_cancellable_gives_up_on_cancel() {
        let ledger = TicketLedger::new(1);
        let _held = ledger.begin().await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(ledger.begin_cancellable(&cancel).await.is_none());
    }

    #[tokio::test]
    async fn reset_waits_for_open_transaction() {
        let ledger = Arc::new(TicketLedger::new(2));
        let txn = ledger.begin().await;
        assert!(txn.try_reserve(1));

        let reset = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.reset(10).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ledger.total(), 2);
        assert_eq!(txn.available(), 1);

        drop(txn);
        reset.await.unwrap();
        assert_eq!(ledger.available(), 10);
    }
}
