//! Foundation types for Tix.
//!
//! This crate provides the identity, record, and outcome types shared by the
//! ledger, the booking store, the allocation engine, and the dispatch pool.
//! Every other Tix crate depends on `tix-types`.
//!
//! # Key Types
//!
//! - [`RequesterId`]: Validated, non-blank identifier of whoever asks for a ticket
//! - [`BookingId`]: Process-unique booking identifier
//! - [`BookingIdGenerator`]: Timestamp + atomic sequence id source
//! - [`Booking`]: Immutable record of one consumed ticket
//! - [`Outcome`] / [`AllocationResult`]: Result of one allocation attempt
//! - [`Stats`]: Point-in-time ledger aggregates

pub mod booking;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod stats;

pub use booking::Booking;
pub use error::TypeError;
pub use identity::{BookingId, BookingIdGenerator, RequesterId};
pub use outcome::{AllocationResult, Outcome};
pub use stats::Stats;
