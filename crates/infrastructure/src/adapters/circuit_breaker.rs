//! Circuit breaker gating real backend calls
//!
//! One breaker is shared by every worker driving a backend. All runtime
//! state sits behind a single lock so concurrent `allow`/`record` calls are
//! serialized.
//!
//! # States
//!
//! - **Closed**: Normal operation, calls pass through
//! - **Open**: Backend is considered down, calls are served by fallback
//! - **Half-Open**: One probe call tests whether the backend recovered
//!
//! # Threshold policy
//!
//! Failures are counted in streaks. A streak starts at its first failure and
//! lasts `failure_window_ms`; a failure after that starts a new streak. The
//! breaker opens when a streak reaches `failure_threshold`. Any success while
//! closed ends the streak.
//!
//! # Half-open probe
//!
//! The permit is not tied to the caller it was granted to. The first
//! `record` while half-open settles the probe, including a late result from
//! a call admitted before the trip.

use std::fmt;
use std::sync::Arc;

use application::ports::{CircuitBreakerPort, ClockPort};
use domain::{BreakerConfig, BreakerSnapshot, CircuitState, RecoveryEvent};
use parking_lot::Mutex;

/// Internal state tracking
#[derive(Debug, Default)]
struct BreakerRuntime {
    state: CircuitState,
    failure_count: u32,
    streak_started_at_ms: Option<u64>,
    last_failure_time_ms: Option<u64>,
    tripped_at_ms: Option<u64>,
    recovery_started_at_ms: Option<u64>,
    probe_in_flight: bool,
    recoveries: u64,
    trips: u64,
}

impl BreakerRuntime {
    fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.state,
            failure_count: self.failure_count,
            last_failure_time_ms: self.last_failure_time_ms,
            recovery_started_at_ms: self.recovery_started_at_ms,
            recoveries: self.recoveries,
            trips: self.trips,
        }
    }
}

/// Three-state circuit breaker
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    clock: Arc<dyn ClockPort>,
    runtime: Mutex<BreakerRuntime>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a closed circuit breaker
    pub fn new(name: impl Into<String>, config: BreakerConfig, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            name: name.into(),
            config,
            clock,
            runtime: Mutex::new(BreakerRuntime::default()),
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration
    #[must_use]
    pub const fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Returns true if the circuit is closed (normal operation)
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    /// Returns true if the circuit is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    fn on_failure(&self, rt: &mut BreakerRuntime, now_ms: u64) {
        rt.failure_count = rt.failure_count.saturating_add(1);
        rt.last_failure_time_ms = Some(now_ms);

        match rt.state {
            CircuitState::Closed => {
                let streak_expired = rt
                    .streak_started_at_ms
                    .is_none_or(|start| now_ms.saturating_sub(start) > self.config.failure_window_ms);
                if streak_expired {
                    rt.streak_started_at_ms = Some(now_ms);
                    rt.failure_count = 1;
                }

                if rt.failure_count >= self.config.failure_threshold {
                    tracing::warn!(
                        circuit = %self.name,
                        failures = rt.failure_count,
                        state = %CircuitState::Open,
                        "Circuit transitioning from Closed to Open"
                    );
                    rt.state = CircuitState::Open;
                    rt.tripped_at_ms = Some(now_ms);
                    rt.streak_started_at_ms = None;
                    rt.trips += 1;
                }
            },
            CircuitState::HalfOpen => {
                tracing::warn!(
                    circuit = %self.name,
                    failures = rt.failure_count,
                    state = %CircuitState::Open,
                    "Circuit transitioning from HalfOpen to Open after failed probe"
                );
                rt.state = CircuitState::Open;
                rt.recovery_started_at_ms = None;
                rt.probe_in_flight = false;
            },
            CircuitState::Open => {
                tracing::debug!(
                    circuit = %self.name,
                    failures = rt.failure_count,
                    "Late failure while open, recovery timer restarted"
                );
            },
        }
    }

    fn on_success(&self, rt: &mut BreakerRuntime, now_ms: u64) -> Option<RecoveryEvent> {
        match rt.state {
            CircuitState::HalfOpen => {
                let opened_at_ms = rt.recovery_started_at_ms.unwrap_or(now_ms);
                let event = RecoveryEvent {
                    tripped_at_ms: rt.tripped_at_ms.unwrap_or(opened_at_ms),
                    opened_at_ms,
                    closed_at_ms: now_ms,
                };
                tracing::info!(
                    circuit = %self.name,
                    state = %CircuitState::Closed,
                    recovery_ms = event.duration_ms(),
                    outage_ms = event.outage_ms(),
                    "Circuit transitioning from HalfOpen to Closed"
                );
                rt.state = CircuitState::Closed;
                rt.failure_count = 0;
                rt.streak_started_at_ms = None;
                rt.tripped_at_ms = None;
                rt.recovery_started_at_ms = None;
                rt.probe_in_flight = false;
                rt.recoveries += 1;
                Some(event)
            },
            CircuitState::Closed => {
                rt.failure_count = 0;
                rt.streak_started_at_ms = None;
                None
            },
            CircuitState::Open => None,
        }
    }
}

impl CircuitBreakerPort for CircuitBreaker {
    fn allow(&self) -> bool {
        let now_ms = self.clock.now_ms();
        let mut rt = self.runtime.lock();

        match rt.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let since_failure = rt
                    .last_failure_time_ms
                    .map_or(u64::MAX, |last| now_ms.saturating_sub(last));
                if since_failure > self.config.recovery_timeout_ms {
                    tracing::info!(
                        circuit = %self.name,
                        elapsed_ms = since_failure,
                        state = %CircuitState::HalfOpen,
                        "Circuit transitioning from Open to HalfOpen"
                    );
                    rt.state = CircuitState::HalfOpen;
                    rt.recovery_started_at_ms = Some(now_ms);
                    rt.probe_in_flight = true;
                    true
                } else {
                    false
                }
            },
            CircuitState::HalfOpen => {
                // A probe that never reported back must not wedge the breaker.
                let probe_stale = rt.recovery_started_at_ms.is_none_or(|started| {
                    now_ms.saturating_sub(started) > self.config.recovery_timeout_ms
                });
                if !rt.probe_in_flight || probe_stale {
                    tracing::debug!(circuit = %self.name, "Granting half-open probe");
                    rt.recovery_started_at_ms = Some(now_ms);
                    rt.probe_in_flight = true;
                    true
                } else {
                    false
                }
            },
        }
    }

    fn record(&self, succeeded: bool) -> Option<RecoveryEvent> {
        let now_ms = self.clock.now_ms();
        let mut rt = self.runtime.lock();
        if succeeded {
            self.on_success(&mut rt, now_ms)
        } else {
            self.on_failure(&mut rt, now_ms);
            None
        }
    }

    fn state(&self) -> CircuitState {
        self.runtime.lock().state
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.runtime.lock().snapshot()
    }
}
