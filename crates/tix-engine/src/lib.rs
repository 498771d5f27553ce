//! Allocation engine for Tix.
//!
//! Turns one requester id into one [`Outcome`](tix_types::Outcome) by running
//! a single logical transaction against the [`TicketLedger`](tix_ledger::TicketLedger)
//! and a [`BookingStore`](tix_store::BookingStore):
//!
//! ```text
//! validate ─► fast sold-out check ─► begin txn ─► recheck ─► persist booking ─► reserve ─► commit
//!                                                               │ fail              │ fail
//!                                                               ▼                   ▼
//!                                                          StorageError       roll back booking
//! ```
//!
//! A booking exists if and only if its ticket was counted as consumed.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{AllocationEngine, Audit};
pub use error::{EngineError, EngineResult};
