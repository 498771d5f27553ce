use std::future::Future;
use std::sync::Arc;

use tix_engine::AllocationEngine;
use tix_ledger::TicketLedger;
use tix_store::{BookingStore, InMemoryBookingStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Tix booking server.
pub struct TixServer {
    config: ServerConfig,
    state: AppState,
}

impl TixServer {
    /// Build a server around a fresh in-memory ledger and store.
    pub fn new(config: ServerConfig) -> Self {
        let store: Arc<dyn BookingStore> = Arc::new(InMemoryBookingStore::new());
        let ledger = Arc::new(TicketLedger::new(config.total_tickets));
        Self::with_engine(config, Arc::new(AllocationEngine::new(ledger, store)))
    }

    pub fn with_engine(config: ServerConfig, engine: Arc<AllocationEngine<dyn BookingStore>>) -> Self {
        Self {
            config,
            state: AppState {
                engine,
                cancel: CancellationToken::new(),
            },
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    ///
    /// Allocations still waiting on the ledger when shutdown begins are
    /// answered with `Cancelled`.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state.clone());
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            total_tickets = self.config.total_tickets,
            "Tix server listening on {}",
            self.config.bind_addr
        );

        let cancel = self.state.cancel.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("shutdown signal received");
                cancel.cancel();
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let stats = self.state.engine.stats();
        tracing::info!(
            booked = stats.booked,
            available = stats.available,
            "Tix server exited"
        );
        Ok(())
    }

    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn server_construction() {
        let server = TixServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(server.state().engine.stats().available, 50_000);
    }

    #[test]
    fn router_builds() {
        let server = TixServer::new(ServerConfig::default());
        let _router = server.router();
    }

    #[tokio::test]
    async fn shuts_down_on_signal() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            total_tickets: 1,
        };
        let server = TixServer::new(config);
        let cancel = server.state().cancel.clone();

        let served = tokio::time::timeout(
            Duration::from_secs(2),
            server.serve_with_shutdown(async {}),
        )
        .await
        .unwrap();
        assert!(served.is_ok());
        assert!(cancel.is_cancelled());
    }
}
