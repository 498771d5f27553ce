use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tix_engine::{AllocationEngine, Audit, EngineConfig};
use tix_ledger::TicketLedger;
use tix_pool::{spawn_deadline, DispatchPool, PoolConfig, PoolError, Submitter};
use tix_store::InMemoryBookingStore;
use tix_types::{AllocationResult, Outcome, Stats};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SimulationConfig;

/// Per-outcome result counts seen by the consumer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub processed: u64,
    pub successes: u64,
    pub sold_out: u64,
    pub invalid: u64,
    pub storage_errors: u64,
    pub cancelled: u64,
}

impl Tally {
    pub fn record(&mut self, result: &AllocationResult) {
        self.processed += 1;
        match &result.outcome {
            Outcome::Success(_) => self.successes += 1,
            Outcome::SoldOut => self.sold_out += 1,
            Outcome::InvalidInput => self.invalid += 1,
            Outcome::StorageError(_) => self.storage_errors += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }

    pub fn failures(&self) -> u64 {
        self.processed - self.successes
    }
}

/// Outcome of one `tix simulate` run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub elapsed: Duration,
    pub requested: u64,
    pub accepted: u64,
    pub tally: Tally,
    pub stats: Stats,
    pub audit: Audit,
    pub deadline_hit: bool,
}

impl SimulationReport {
    /// Successful results match booked units and every booking is accounted for.
    pub fn is_consistent(&self) -> bool {
        self.tally.successes == self.stats.booked && self.audit.is_consistent()
    }

    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tally.processed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn mean_per_request(&self) -> Duration {
        match u32::try_from(self.tally.processed) {
            Ok(n) if n > 0 => self.elapsed / n,
            _ => Duration::ZERO,
        }
    }
}

/// Requester id used for the `i`th simulated request.
pub fn requester_id(i: u64) -> String {
    format!("USER-{i:06}")
}

/// Drive `config.requests` requests through a fresh pool of `config.tickets`.
pub async fn run(
    config: &SimulationConfig,
    engine_config: EngineConfig,
) -> anyhow::Result<SimulationReport> {
    let store = Arc::new(InMemoryBookingStore::with_capacity(
        usize::try_from(config.tickets).unwrap_or(usize::MAX),
    ));
    let ledger = Arc::new(TicketLedger::new(config.tickets));
    let engine = Arc::new(AllocationEngine::with_config(ledger, store, engine_config));

    let cancel = CancellationToken::new();
    let deadline = spawn_deadline(cancel.clone(), Duration::from_secs(config.timeout_secs));

    let mut pool = DispatchPool::start(engine, PoolConfig::for_workers(config.workers), cancel.clone())
        .context("starting dispatch pool")?;
    let results = pool
        .take_results()
        .context("result stream already taken")?;

    info!(
        tickets = config.tickets,
        requests = config.requests,
        workers = config.workers,
        "simulation started"
    );
    let started = Instant::now();

    let consumer = tokio::spawn(consume(results, config.requests, config.progress_every));

    let mut producers = JoinSet::new();
    let batch = config.batch_size.max(1);
    let mut start = 0;
    while start < config.requests {
        let end = start.saturating_add(batch).min(config.requests);
        producers.spawn(produce(pool.submitter(), start, end));
        start = end;
    }
    while let Some(joined) = producers.join_next().await {
        joined.context("producer task failed")?;
    }

    pool.stop().await;
    let tally = consumer.await.context("consumer task failed")?;
    let elapsed = started.elapsed();

    let deadline_hit = cancel.is_cancelled();
    deadline.abort();

    let audit = pool.engine().audit().await?;
    Ok(SimulationReport {
        elapsed,
        requested: config.requests,
        accepted: pool.accepted(),
        tally,
        stats: pool.stats(),
        audit,
        deadline_hit,
    })
}

async fn produce(submitter: Submitter, start: u64, end: u64) {
    for i in start..end {
        match submitter.submit(requester_id(i)).await {
            Ok(()) => {}
            Err(PoolError::Cancelled) => {
                warn!(submitted = i - start, "deadline reached; producer stopping");
                return;
            }
            Err(err) => {
                warn!(error = %err, "producer stopping");
                return;
            }
        }
    }
}

async fn consume(
    mut results: mpsc::Receiver<AllocationResult>,
    expected: u64,
    progress_every: u64,
) -> Tally {
    let mut tally = Tally::default();
    while let Some(result) = results.recv().await {
        tally.record(&result);
        if progress_every > 0 && tally.processed % progress_every == 0 {
            info!(
                processed = tally.processed,
                expected,
                successes = tally.successes,
                "progress"
            );
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(tickets: u64, requests: u64) -> SimulationConfig {
        SimulationConfig {
            tickets,
            requests,
            workers: 8,
            timeout_secs: 10,
            batch_size: 7,
            progress_every: 10,
        }
    }

    #[test]
    fn requester_ids_are_zero_padded() {
        assert_eq!(requester_id(0), "USER-000000");
        assert_eq!(requester_id(4217), "USER-004217");
        assert_eq!(requester_id(1_234_567), "USER-1234567");
    }

    #[test]
    fn tally_counts_each_outcome() {
        let mut tally = Tally::default();
        for outcome in [Outcome::SoldOut, Outcome::Cancelled, Outcome::InvalidInput] {
            tally.record(&AllocationResult {
                requester_id: "x".into(),
                outcome,
            });
        }
        assert_eq!(tally.processed, 3);
        assert_eq!(tally.failures(), 3);
        assert_eq!(tally.sold_out, 1);
        assert_eq!(tally.cancelled, 1);
        assert_eq!(tally.invalid, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn oversubscribed_run_books_every_ticket() {
        let report = run(&small(40, 100), EngineConfig::default()).await.unwrap();

        assert!(report.is_consistent());
        assert!(!report.deadline_hit);
        assert_eq!(report.accepted, 100);
        assert_eq!(report.tally.processed, 100);
        assert_eq!(report.tally.successes, 40);
        assert_eq!(report.tally.sold_out, 60);
        assert_eq!(report.stats.available, 0);
        assert_eq!(report.audit.bookings, 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn undersubscribed_run_leaves_remainder() {
        let config = EngineConfig::with_latency_jitter(Duration::from_micros(50));
        let report = run(&small(100, 30), config).await.unwrap();

        assert!(report.is_consistent());
        assert_eq!(report.tally.successes, 30);
        assert_eq!(report.stats.available, 70);
        assert!(report.requests_per_sec() > 0.0);
    }

    #[tokio::test]
    async fn empty_run_is_consistent() {
        let report = run(&small(5, 0), EngineConfig::default()).await.unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.tally, Tally::default());
        assert_eq!(report.mean_per_request(), Duration::ZERO);
    }
}
