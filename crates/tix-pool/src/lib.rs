//! Dispatch pool for Tix.
//!
//! A fixed set of workers consumes a bounded request queue, runs each
//! request through the [`AllocationEngine`](tix_engine::AllocationEngine), and
//! publishes one [`AllocationResult`](tix_types::AllocationResult) per request
//! to a bounded result stream.
//!
//! ```text
//! submit ─► [request queue, 2N] ─► worker × N ─► engine ─► [result stream, 10N] ─► consumer
//! ```
//!
//! Shutdown: [`DispatchPool::stop`] closes the queue, waits for every worker
//! to drain it and exit, and only then does the result stream end. A shared
//! [`CancellationToken`](tokio_util::sync::CancellationToken) aborts every
//! blocking step when the caller's deadline lapses.

pub mod config;
pub mod deadline;
pub mod error;
pub mod pool;
mod worker;

pub use config::PoolConfig;
pub use deadline::spawn_deadline;
pub use error::{PoolError, PoolResult};
pub use pool::{DispatchPool, Submitter};
