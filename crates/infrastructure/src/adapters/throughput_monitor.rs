//! Throughput monitor
//!
//! Tracks the request rate in fixed windows and compares each closed window
//! against the first one. Every worker ticks the same monitor.

use std::sync::Arc;

use application::ports::{ClockPort, ThroughputPort};
use domain::{ThroughputRoll, ThroughputWindow};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Default monitoring window length
pub const DEFAULT_THROUGHPUT_WINDOW_MS: u64 = 10_000;

/// Shared throughput monitor
#[derive(Debug)]
pub struct ThroughputMonitor {
    interval_ms: u64,
    window: Mutex<ThroughputWindow>,
}

impl ThroughputMonitor {
    /// Start monitoring now
    pub fn new(interval_ms: u64, clock: &Arc<dyn ClockPort>) -> Self {
        Self::starting_at(interval_ms, clock.now_ms())
    }

    /// Start monitoring with the first window opening at `now_ms`
    pub const fn starting_at(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            window: Mutex::new(ThroughputWindow::starting_at(now_ms)),
        }
    }

    /// Window length in milliseconds
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

impl ThroughputPort for ThroughputMonitor {
    fn tick(&self) {
        self.window.lock().tick();
    }

    fn maybe_roll(&self, now_ms: u64) -> Option<ThroughputRoll> {
        let roll = self.window.lock().maybe_roll(now_ms, self.interval_ms)?;
        match roll {
            ThroughputRoll::Baseline { rate } => {
                info!(rate, "Throughput baseline captured");
            },
            ThroughputRoll::Degraded {
                rate,
                degradation_pct,
            } => {
                debug!(rate, degradation_pct, "Throughput below baseline");
            },
            ThroughputRoll::Steady { rate } => {
                debug!(rate, "Throughput at or above baseline");
            },
        }
        Some(roll)
    }

    fn snapshot(&self) -> ThroughputWindow {
        *self.window.lock()
    }
}
