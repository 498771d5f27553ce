//! Booking storage for Tix.
//!
//! Bookings are immutable records keyed by [`BookingId`](tix_types::BookingId)
//! and queryable by requester. The store is a pure keyed map: it never
//! consults the ticket ledger and never decides whether a booking is allowed.
//!
//! # Storage Backends
//!
//! All backends implement the [`BookingStore`] trait:
//!
//! - [`InMemoryBookingStore`] -- `HashMap` behind a `RwLock`
//! - [`FaultInjectingStore`] -- wrapper that fails chosen writes, for exercising
//!   rollback paths
//!
//! # Design Rules
//!
//! 1. Records are never mutated once written.
//! 2. `create` refuses an id that is already present.
//! 3. `delete` exists only for compensating a failed transaction.
//! 4. Concurrent readers share the lock; writers take it exclusively.

pub mod error;
pub mod fault;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fault::FaultInjectingStore;
pub use memory::InMemoryBookingStore;
pub use traits::BookingStore;
