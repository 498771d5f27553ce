use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tix_engine::AllocationEngine;
use tix_store::BookingStore;
use tix_types::{AllocationResult, Stats};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::worker::Worker;

/// Fixed-size set of allocation workers behind a bounded queue.
pub struct DispatchPool<S: ?Sized> {
    engine: Arc<AllocationEngine<S>>,
    requests: Option<mpsc::Sender<String>>,
    results: Option<mpsc::Receiver<AllocationResult>>,
    workers: JoinSet<()>,
    cancel: CancellationToken,
    accepted: Arc<AtomicU64>,
    config: PoolConfig,
}

impl<S: BookingStore + ?Sized + 'static> DispatchPool<S> {
    /// Spawn `config.workers` workers on the current tokio runtime.
    ///
    /// `cancel` bounds the pool's operating window: once it fires, no new
    /// requests are admitted and every blocked step gives up.
    pub fn start(
        engine: Arc<AllocationEngine<S>>,
        config: PoolConfig,
        cancel: CancellationToken,
    ) -> PoolResult<Self> {
        config.validate()?;

        let (request_tx, request_rx) = mpsc::channel(config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(config.result_capacity);
        let requests = Arc::new(Mutex::new(request_rx));

        let mut workers = JoinSet::new();
        for id in 0..config.workers {
            let worker = Worker {
                id,
                engine: Arc::clone(&engine),
                requests: Arc::clone(&requests),
                results: result_tx.clone(),
                cancel: cancel.clone(),
            };
            workers.spawn(worker.run());
        }
        // Workers now own every result sender; the stream ends with the last one.
        drop(result_tx);

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            result_capacity = config.result_capacity,
            "dispatch pool started"
        );

        Ok(Self {
            engine,
            requests: Some(request_tx),
            results: Some(result_rx),
            workers,
            cancel,
            accepted: Arc::new(AtomicU64::new(0)),
            config,
        })
    }

    /// Queue one allocation attempt, waiting while the queue is full.
    pub async fn submit(&self, requester_id: impl Into<String>) -> PoolResult<()> {
        let tx = self.requests.as_ref().ok_or(PoolError::Closed)?;
        send_request(tx, requester_id.into(), &self.cancel, &self.accepted).await
    }

    /// Cloneable producer handle for submitting from many tasks.
    ///
    /// Handles do not keep the queue open: after [`DispatchPool::stop`] they
    /// report [`PoolError::Closed`].
    pub fn submitter(&self) -> Submitter {
        Submitter {
            requests: self.requests.as_ref().map(mpsc::Sender::downgrade),
            cancel: self.cancel.clone(),
            accepted: Arc::clone(&self.accepted),
        }
    }

    /// Take the result stream. Returns `None` after the first call.
    ///
    /// The stream must be drained while the pool runs; a full stream stalls
    /// workers until cancellation.
    pub fn take_results(&mut self) -> Option<mpsc::Receiver<AllocationResult>> {
        self.results.take()
    }

    pub fn stats(&self) -> Stats {
        self.engine.stats()
    }

    /// Requests accepted by `submit` so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<AllocationEngine<S>> {
        &self.engine
    }

    /// Close the queue, wait for every worker to exit, then end the stream.
    ///
    /// Queued requests are drained first unless cancellation fires, in which
    /// case workers abandon whatever they were blocked on.
    pub async fn stop(&mut self) {
        drop(self.requests.take());

        while let Some(joined) = self.workers.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "dispatch worker failed");
            }
        }

        info!(
            accepted = self.accepted(),
            cancelled = self.cancel.is_cancelled(),
            "dispatch pool stopped"
        );
    }
}

/// Producer handle returned by [`DispatchPool::submitter`].
#[derive(Clone)]
pub struct Submitter {
    requests: Option<mpsc::WeakSender<String>>,
    cancel: CancellationToken,
    accepted: Arc<AtomicU64>,
}

impl Submitter {
    /// Same semantics as [`DispatchPool::submit`].
    pub async fn submit(&self, requester_id: impl Into<String>) -> PoolResult<()> {
        let tx = self
            .requests
            .as_ref()
            .and_then(mpsc::WeakSender::upgrade)
            .ok_or(PoolError::Closed)?;
        send_request(&tx, requester_id.into(), &self.cancel, &self.accepted).await
    }
}

async fn send_request(
    tx: &mpsc::Sender<String>,
    requester_id: String,
    cancel: &CancellationToken,
    accepted: &AtomicU64,
) -> PoolResult<()> {
    if cancel.is_cancelled() {
        return Err(PoolError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PoolError::Cancelled),
        sent = tx.send(requester_id) => {
            sent.map_err(|_| PoolError::Closed)?;
            accepted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
