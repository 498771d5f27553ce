//! HTTP adapter for Tix.
//!
//! Exposes the allocation engine over a small JSON API. The adapter owns
//! nothing but the mapping from outcomes to status codes; all allocation
//! semantics stay in `tix-engine`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::TixServer;
