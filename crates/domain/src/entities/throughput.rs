//! Throughput window and degradation math

use serde::{Deserialize, Serialize};

/// Percentage by which `rate` falls below `baseline`, clamped at zero
///
/// Returns 0 when the baseline is not positive.
#[must_use]
pub fn degradation_pct(baseline: f64, rate: f64) -> f64 {
    if baseline <= 0.0 {
        return 0.0;
    }
    ((baseline - rate) / baseline * 100.0).max(0.0)
}

/// Outcome of closing a monitoring window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThroughputRoll {
    /// First window after startup; its rate became the baseline
    Baseline { rate: f64 },
    /// Rate fell below baseline
    Degraded { rate: f64, degradation_pct: f64 },
    /// Rate at or above baseline; nothing to emit
    Steady { rate: f64 },
}

impl ThroughputRoll {
    /// Measured rate in requests per second
    #[must_use]
    pub const fn rate(&self) -> f64 {
        match self {
            Self::Baseline { rate } | Self::Degraded { rate, .. } | Self::Steady { rate } => *rate,
        }
    }

    /// Degradation to emit, if any
    #[must_use]
    pub const fn degradation(&self) -> Option<f64> {
        match self {
            Self::Degraded {
                degradation_pct, ..
            } => Some(*degradation_pct),
            Self::Baseline { .. } | Self::Steady { .. } => None,
        }
    }
}

/// Sliding request-rate window
///
/// `baseline_rate` is set exactly once, by the first window closed after
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputWindow {
    /// Start of the current window (epoch milliseconds)
    pub window_start_ms: u64,
    /// Requests counted in the current window
    pub request_count: u64,
    /// Rate of the first closed window
    pub baseline_rate: Option<f64>,
    /// Rate of the most recently closed window
    pub last_rate: f64,
}

impl ThroughputWindow {
    /// Open the first window at `now_ms`
    #[must_use]
    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            window_start_ms: now_ms,
            request_count: 0,
            baseline_rate: None,
            last_rate: 0.0,
        }
    }

    /// Count one request in the current window
    pub const fn tick(&mut self) {
        self.request_count = self.request_count.saturating_add(1);
    }

    /// Close the window if at least `interval_ms` has elapsed
    ///
    /// Returns `None` while the window is still open. After closing, a new
    /// window starts at `now_ms` with a zero count.
    #[allow(clippy::cast_precision_loss)]
    pub fn maybe_roll(&mut self, now_ms: u64, interval_ms: u64) -> Option<ThroughputRoll> {
        let elapsed_ms = now_ms.saturating_sub(self.window_start_ms);
        if elapsed_ms < interval_ms || elapsed_ms == 0 {
            return None;
        }

        let rate = self.request_count as f64 / (elapsed_ms as f64 / 1000.0);
        self.last_rate = rate;

        let roll = match self.baseline_rate {
            None => {
                self.baseline_rate = Some(rate);
                ThroughputRoll::Baseline { rate }
            },
            Some(baseline) => {
                let pct = degradation_pct(baseline, rate);
                if pct > 0.0 {
                    ThroughputRoll::Degraded {
                        rate,
                        degradation_pct: pct,
                    }
                } else {
                    ThroughputRoll::Steady { rate }
                }
            },
        };

        self.request_count = 0;
        self.window_start_ms = now_ms;
        Some(roll)
    }
}
