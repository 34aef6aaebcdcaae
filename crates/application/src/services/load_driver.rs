//! Load driver - Runs the probe from many concurrent workers
//!
//! Each worker is a Tokio task looping over [`ResilienceProbe::run_iteration`].
//! Stop is broadcast over a watch channel; workers that are still busy after
//! the graceful-stop window are aborted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{BreakerSnapshot, Protocol};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::resilience_probe::ResilienceProbe;
use crate::ports::MetricsSnapshot;

/// Worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSettings {
    /// Number of concurrent workers
    pub vus: u32,
    /// How long workers keep iterating
    pub duration: Duration,
    /// How long to wait for in-flight iterations after stop
    pub graceful_stop: Duration,
    /// Pause between two iterations of the same worker
    pub iteration_pause: Duration,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            vus: 500,
            duration: Duration::from_secs(120),
            graceful_stop: Duration::from_secs(30),
            iteration_pause: Duration::from_millis(100),
        }
    }
}

/// Outcome of one protocol run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub protocol: Protocol,
    pub iterations: u64,
    pub forced_faults: u64,
    pub elapsed_ms: u64,
    pub breaker: BreakerSnapshot,
    pub baseline_rate: Option<f64>,
    pub last_rate: f64,
    pub metrics: MetricsSnapshot,
    /// Workers aborted after the graceful-stop window
    pub aborted_workers: usize,
}

/// Spawns and stops the worker pool around one probe
#[derive(Debug)]
pub struct LoadDriver {
    probe: Arc<ResilienceProbe>,
    settings: LoadSettings,
}

impl LoadDriver {
    /// Create a driver for the given probe
    pub const fn new(probe: Arc<ResilienceProbe>, settings: LoadSettings) -> Self {
        Self { probe, settings }
    }

    /// Probe driven by this pool
    pub const fn probe(&self) -> &Arc<ResilienceProbe> {
        &self.probe
    }

    /// Run for the configured duration
    pub async fn run(&self) -> RunSummary {
        self.run_until(tokio::time::sleep(self.settings.duration))
            .await
    }

    /// Run until `shutdown` completes
    #[instrument(skip(self, shutdown), fields(protocol = %self.probe.protocol(), vus = self.settings.vus))]
    pub async fn run_until<F>(&self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut workers = JoinSet::new();

        for worker in 0..u64::from(self.settings.vus) {
            let probe = Arc::clone(&self.probe);
            let stop = stop_rx.clone();
            let pause = self.settings.iteration_pause;
            workers.spawn(worker_loop(probe, worker, stop, pause));
        }
        info!("Workers started");

        shutdown.await;
        if stop_tx.send(true).is_err() {
            warn!("All workers exited before stop");
        }

        let drained = tokio::time::timeout(self.settings.graceful_stop, async {
            while let Some(joined) = workers.join_next().await {
                if let Err(err) = joined {
                    warn!(error = %err, "Worker task failed");
                }
            }
        })
        .await;

        let aborted_workers = if drained.is_err() {
            let remaining = workers.len();
            warn!(remaining, "Graceful stop elapsed, aborting workers");
            workers.abort_all();
            while workers.join_next().await.is_some() {}
            remaining
        } else {
            0
        };

        let summary = self.summarize(aborted_workers);
        info!(
            iterations = summary.iterations,
            errors = summary.metrics.errors,
            fallbacks = summary.metrics.fallbacks,
            state = %summary.breaker.state,
            "Run finished"
        );
        summary
    }

    /// Collect the current state into a summary
    pub fn summarize(&self, aborted_workers: usize) -> RunSummary {
        let ports = self.probe.ports();
        let window = ports.throughput.snapshot();
        RunSummary {
            protocol: self.probe.protocol(),
            iterations: self.probe.iterations(),
            forced_faults: self.probe.forced_faults(),
            elapsed_ms: self.probe.elapsed_ms(),
            breaker: ports.breaker.snapshot(),
            baseline_rate: window.baseline_rate,
            last_rate: window.last_rate,
            metrics: ports.metrics.snapshot(),
            aborted_workers,
        }
    }
}

async fn worker_loop(
    probe: Arc<ResilienceProbe>,
    worker: u64,
    mut stop: watch::Receiver<bool>,
    pause: Duration,
) {
    let mut iteration = 0_u64;
    while !*stop.borrow() {
        probe.run_iteration(worker, iteration).await;
        iteration += 1;
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep(pause) => {}
        }
    }
}
