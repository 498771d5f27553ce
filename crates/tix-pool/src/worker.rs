use std::sync::Arc;

use tix_engine::AllocationEngine;
use tix_store::BookingStore;
use tix_types::AllocationResult;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Receiving half of the request queue, shared by every worker.
pub(crate) type SharedRequests = Arc<Mutex<mpsc::Receiver<String>>>;

pub(crate) struct Worker<S: ?Sized> {
    pub id: usize,
    pub engine: Arc<AllocationEngine<S>>,
    pub requests: SharedRequests,
    pub results: mpsc::Sender<AllocationResult>,
    pub cancel: CancellationToken,
}

impl<S: BookingStore + ?Sized> Worker<S> {
    /// Dequeue, allocate, publish, repeat.
    ///
    /// Exits when the queue is closed and drained, when the result stream has
    /// no receiver, or when cancellation fires at a blocking step.
    pub async fn run(self) {
        debug!(worker = self.id, "worker started");
        let mut processed = 0u64;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = async { self.requests.lock().await.recv().await } => next,
            };
            let Some(requester_id) = next else {
                break;
            };

            let outcome = self.engine.allocate(&requester_id, &self.cancel).await;
            let result = AllocationResult::new(requester_id, outcome);
            processed += 1;

            match self.results.try_send(result) {
                Ok(()) => {}
                Err(TrySendError::Closed(_)) => break,
                Err(TrySendError::Full(result)) => {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        sent = self.results.send(result) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        debug!(worker = self.id, processed, "worker exited");
    }
}
