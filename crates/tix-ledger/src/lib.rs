//! Ticket ledger for Tix.
//!
//! The ledger owns the two authoritative counters of the ticket pool,
//! `total` and `available`, and is the only component allowed to touch them.
//! It provides:
//! - A linearizable [`TicketLedger::try_reserve`] (check and decrement in one step)
//! - An exclusive transaction scope ([`LedgerTxn`]) that callers hold across a
//!   whole check-persist-decrement sequence
//! - [`TicketLedger::stats`], the read-only aggregate snapshot
//!
//! # Invariants
//!
//! 1. `0 <= available <= total` at every instant.
//! 2. `available` only decreases through `try_reserve`, and only `reset`
//!    raises it.
//! 3. `reset` runs inside the transaction scope, so it never interleaves with
//!    an in-flight allocation.

pub mod ledger;
pub mod stats;

pub use ledger::{LedgerTxn, TicketLedger};
