//! Resilience probe - One iteration of the resilience engine
//!
//! Every worker calls [`ResilienceProbe::run_iteration`] in a loop. The probe
//! decides whether to call the real backend, forces a delay inside the fault
//! window, classifies the outcome and feeds it to the shared breaker.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::{ProbeRequest, Protocol, ResilienceMetric, ResultSample};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::ApplicationError;
use crate::ports::{
    BackendPort, BackendResponse, CircuitBreakerPort, ClockPort, FallbackPort,
    FaultInjectionPort, MetricsPort, ThroughputPort,
};

/// Default latency above which a successful call is classified as failed
pub const DEFAULT_SLOW_CALL_THRESHOLD_MS: u64 = 10_000;

/// Default per-call deadline
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// Classification settings for the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Calls slower than this are failures even when the backend succeeded
    pub slow_call_threshold_ms: u64,
    /// Deadline for one backend call
    pub call_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            slow_call_threshold_ms: DEFAULT_SLOW_CALL_THRESHOLD_MS,
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }
}

/// Collaborators the probe composes
#[derive(Clone)]
pub struct ProbePorts {
    pub backend: Arc<dyn BackendPort>,
    pub breaker: Arc<dyn CircuitBreakerPort>,
    pub faults: Arc<dyn FaultInjectionPort>,
    pub fallback: Arc<dyn FallbackPort>,
    pub throughput: Arc<dyn ThroughputPort>,
    pub clock: Arc<dyn ClockPort>,
    pub metrics: Arc<dyn MetricsPort>,
}

impl fmt::Debug for ProbePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbePorts")
            .field("protocol", &self.backend.protocol())
            .finish_non_exhaustive()
    }
}

/// Orchestrates breaker, fault injector, fallback and throughput monitor
/// around one backend
pub struct ResilienceProbe {
    ports: ProbePorts,
    settings: ProbeSettings,
    started_at_ms: u64,
    iterations: AtomicU64,
    forced_faults: AtomicU64,
}

impl fmt::Debug for ResilienceProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilienceProbe")
            .field("protocol", &self.ports.backend.protocol())
            .field("settings", &self.settings)
            .field("started_at_ms", &self.started_at_ms)
            .finish_non_exhaustive()
    }
}

impl ResilienceProbe {
    /// Create a probe; the test start is anchored to the clock's current time
    pub fn new(ports: ProbePorts, settings: ProbeSettings) -> Self {
        let started_at_ms = ports.clock.now_ms();
        Self {
            ports,
            settings,
            started_at_ms,
            iterations: AtomicU64::new(0),
            forced_faults: AtomicU64::new(0),
        }
    }

    /// Protocol of the probed backend
    pub fn protocol(&self) -> Protocol {
        self.ports.backend.protocol()
    }

    /// Collaborators of this probe
    pub const fn ports(&self) -> &ProbePorts {
        &self.ports
    }

    /// Test start in wall-clock milliseconds
    pub const fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Milliseconds since test start
    pub fn elapsed_ms(&self) -> u64 {
        self.ports.clock.now_ms().saturating_sub(self.started_at_ms)
    }

    /// Iterations run so far
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Iterations that fell inside the fault window
    pub fn forced_faults(&self) -> u64 {
        self.forced_faults.load(Ordering::Relaxed)
    }

    /// Run one iteration and return its sample
    ///
    /// Never fails: every error is folded into a failed sample.
    pub async fn run_iteration(&self, worker: u64, iteration: u64) -> ResultSample {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        self.observe_throughput();

        if !self.ports.breaker.allow() {
            debug!(
                protocol = %self.protocol(),
                worker,
                state = %self.ports.breaker.state(),
                "Breaker rejected call, serving fallback"
            );
            return self.ports.fallback.respond();
        }

        let elapsed_ms = self.elapsed_ms();
        let forced_fault = self.ports.faults.should_inject_fault(elapsed_ms);
        if forced_fault {
            self.forced_faults.fetch_add(1, Ordering::Relaxed);
            let delay = self.ports.faults.injected_delay();
            debug!(
                protocol = %self.protocol(),
                worker,
                elapsed_ms,
                delay_ms = delay.as_millis(),
                "Injecting fault delay"
            );
            tokio::time::sleep(delay).await;
        }

        let request = ProbeRequest::for_iteration(self.protocol(), worker, iteration);
        let call_started_ms = self.ports.clock.now_ms();
        let outcome = self.call_backend(&request).await;
        let finished_ms = self.ports.clock.now_ms();
        let duration_ms = finished_ms.saturating_sub(call_started_ms);

        let succeeded = self.classify(outcome.as_ref(), duration_ms, forced_fault);

        if let Some(event) = self.ports.breaker.record(succeeded) {
            #[allow(clippy::cast_precision_loss)]
            let recovery_ms = event.duration_ms() as f64;
            info!(
                protocol = %self.protocol(),
                duration_ms = event.duration_ms(),
                outage_ms = event.outage_ms(),
                "Backend recovered"
            );
            self.ports
                .metrics
                .observe(ResilienceMetric::RecoveryTime, recovery_ms);
        }

        if !succeeded {
            self.ports.metrics.increment(ResilienceMetric::Errors);
        }

        if let Err(err) = &outcome {
            warn!(protocol = %self.protocol(), worker, error = %err, "Backend call failed");
            if err.needs_reconnect() {
                self.reconnect(&request).await;
            }
        }

        ResultSample::call(finished_ms, succeeded, duration_ms, forced_fault)
    }

    fn observe_throughput(&self) {
        self.ports.throughput.tick();
        let now_ms = self.ports.clock.now_ms();
        if let Some(roll) = self.ports.throughput.maybe_roll(now_ms) {
            if let Some(pct) = roll.degradation() {
                debug!(
                    protocol = %self.protocol(),
                    rate = roll.rate(),
                    degradation_pct = pct,
                    "Throughput degraded"
                );
                self.ports
                    .metrics
                    .observe(ResilienceMetric::ThroughputDegradation, pct);
            }
        }
    }

    async fn call_backend(&self, request: &ProbeRequest) -> Result<BackendResponse, ApplicationError> {
        match timeout(self.settings.call_timeout, self.ports.backend.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApplicationError::Timeout(self.settings.call_timeout)),
        }
    }

    fn classify(
        &self,
        outcome: Result<&BackendResponse, &ApplicationError>,
        duration_ms: u64,
        forced_fault: bool,
    ) -> bool {
        let Ok(response) = outcome else {
            return false;
        };
        if !response.indicates_success() {
            debug!(protocol = %self.protocol(), status = response.status, "Backend reported failure");
            return false;
        }
        if duration_ms > self.settings.slow_call_threshold_ms {
            debug!(protocol = %self.protocol(), duration_ms, "Slow call");
            return false;
        }
        !forced_fault
    }

    async fn reconnect(&self, failed: &ProbeRequest) {
        if let Err(err) = self.ports.backend.reconnect(failed).await {
            warn!(protocol = %self.protocol(), error = %err, "Reconnect failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        MockBackendPort, MockCircuitBreakerPort, MockClockPort, MockFallbackPort,
        MockFaultInjectionPort, MockMetricsPort, MockThroughputPort,
    };
    use domain::{CircuitState, RecoveryEvent, ThroughputRoll};
    use serde_json::json;
    use std::sync::atomic::AtomicU64 as Counter;

    fn ok_response() -> BackendResponse {
        BackendResponse::new(200, json!({"success": true}))
    }

    fn fixed_clock(now_ms: u64) -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock.expect_now_ms().return_const(now_ms);
        clock
    }

    fn quiet_throughput() -> MockThroughputPort {
        let mut throughput = MockThroughputPort::new();
        throughput.expect_tick().return_const(());
        throughput.expect_maybe_roll().returning(|_| None);
        throughput
    }

    fn no_faults() -> MockFaultInjectionPort {
        let mut faults = MockFaultInjectionPort::new();
        faults.expect_should_inject_fault().return_const(false);
        faults
    }

    fn closed_breaker() -> MockCircuitBreakerPort {
        let mut breaker = MockCircuitBreakerPort::new();
        breaker.expect_allow().return_const(true);
        breaker.expect_state().return_const(CircuitState::Closed);
        breaker
    }

    fn rest_backend() -> MockBackendPort {
        let mut backend = MockBackendPort::new();
        backend.expect_protocol().return_const(Protocol::Rest);
        backend
    }

    fn unused_fallback() -> MockFallbackPort {
        let mut fallback = MockFallbackPort::new();
        fallback.expect_respond().never();
        fallback
    }

    struct Parts {
        backend: MockBackendPort,
        breaker: MockCircuitBreakerPort,
        faults: MockFaultInjectionPort,
        fallback: MockFallbackPort,
        throughput: MockThroughputPort,
        clock: MockClockPort,
        metrics: MockMetricsPort,
    }

    impl Parts {
        fn into_probe(self, settings: ProbeSettings) -> ResilienceProbe {
            ResilienceProbe::new(
                ProbePorts {
                    backend: Arc::new(self.backend),
                    breaker: Arc::new(self.breaker),
                    faults: Arc::new(self.faults),
                    fallback: Arc::new(self.fallback),
                    throughput: Arc::new(self.throughput),
                    clock: Arc::new(self.clock),
                    metrics: Arc::new(self.metrics),
                },
                settings,
            )
        }
    }

    #[tokio::test]
    async fn open_breaker_serves_fallback_without_calling_backend() {
        let mut backend = rest_backend();
        backend.expect_call().never();

        let mut breaker = MockCircuitBreakerPort::new();
        breaker.expect_allow().return_const(false);
        breaker.expect_state().return_const(CircuitState::Open);
        breaker.expect_record().never();

        let mut fallback = MockFallbackPort::new();
        fallback
            .expect_respond()
            .times(1)
            .returning(|| ResultSample::fallback(1_000, 100));

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().never();

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback,
            throughput: quiet_throughput(),
            clock: fixed_clock(1_000),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        let sample = probe.run_iteration(0, 0).await;
        assert!(sample.was_fallback);
        assert!(sample.succeeded);
        assert!(!sample.is_error());
        assert_eq!(probe.iterations(), 1);
    }

    #[tokio::test]
    async fn successful_call_is_recorded_as_success() {
        let mut backend = rest_backend();
        backend
            .expect_call()
            .withf(|request| request.data == "resilience-test-3-7")
            .times(1)
            .returning(|_| Ok(ok_response()));

        let mut breaker = closed_breaker();
        breaker
            .expect_record()
            .withf(|succeeded| *succeeded)
            .times(1)
            .returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().never();

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(5_000),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        let sample = probe.run_iteration(3, 7).await;
        assert!(sample.succeeded);
        assert!(!sample.forced_fault);
        assert!(!sample.was_fallback);
    }

    #[tokio::test]
    async fn forced_fault_fails_even_when_call_succeeds() {
        let mut backend = rest_backend();
        backend.expect_call().times(1).returning(|_| Ok(ok_response()));

        let mut faults = MockFaultInjectionPort::new();
        faults
            .expect_should_inject_fault()
            .times(1)
            .return_const(true);
        faults
            .expect_injected_delay()
            .return_const(Duration::from_millis(1));

        let mut breaker = closed_breaker();
        breaker
            .expect_record()
            .withf(|succeeded| !*succeeded)
            .times(1)
            .returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics
            .expect_increment()
            .withf(|metric| *metric == ResilienceMetric::Errors)
            .times(1)
            .return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults,
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(45_000),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        let sample = probe.run_iteration(0, 0).await;
        assert!(!sample.succeeded);
        assert!(sample.forced_fault);
        assert_eq!(probe.forced_faults(), 1);
    }

    #[tokio::test]
    async fn non_success_body_is_failure() {
        let mut backend = rest_backend();
        backend
            .expect_call()
            .returning(|_| Ok(BackendResponse::new(200, json!({"success": false}))));
        backend.expect_reconnect().never();

        let mut breaker = closed_breaker();
        breaker
            .expect_record()
            .withf(|succeeded| !*succeeded)
            .returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().times(1).return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(0),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        assert!(!probe.run_iteration(0, 0).await.succeeded);
    }

    #[tokio::test]
    async fn slow_call_is_failure() {
        let mut backend = rest_backend();
        backend.expect_call().returning(|_| Ok(ok_response()));

        // anchor, throughput roll, elapsed and call start read 0; call end reads 250
        let ticks = Arc::new(Counter::new(0));
        let mut clock = MockClockPort::new();
        clock
            .expect_now_ms()
            .returning(move || if ticks.fetch_add(1, Ordering::SeqCst) < 4 { 0 } else { 250 });

        let mut breaker = closed_breaker();
        breaker
            .expect_record()
            .withf(|succeeded| !*succeeded)
            .returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().times(1).return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock,
            metrics,
        }
        .into_probe(ProbeSettings {
            slow_call_threshold_ms: 100,
            ..ProbeSettings::default()
        });

        let sample = probe.run_iteration(0, 0).await;
        assert!(!sample.succeeded);
        assert_eq!(sample.duration_ms, 250);
    }

    #[tokio::test]
    async fn transport_error_fails_and_reconnects() {
        let mut backend = rest_backend();
        backend
            .expect_call()
            .returning(|_| Err(ApplicationError::Transport("connection refused".into())));
        backend
            .expect_reconnect()
            .withf(|failed| failed.data == "resilience-test-0-0")
            .times(1)
            .returning(|_| Ok(()));

        let mut breaker = closed_breaker();
        breaker
            .expect_record()
            .withf(|succeeded| !*succeeded)
            .returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().times(1).return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(0),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        let sample = probe.run_iteration(0, 0).await;
        assert!(!sample.succeeded);
        assert!(!sample.was_fallback);
    }

    #[tokio::test]
    async fn failed_reconnect_is_swallowed() {
        let mut backend = rest_backend();
        backend
            .expect_call()
            .returning(|_| Err(ApplicationError::Timeout(Duration::from_secs(30))));
        backend
            .expect_reconnect()
            .times(1)
            .returning(|_| Err(ApplicationError::Transport("still down".into())));

        let mut breaker = closed_breaker();
        breaker.expect_record().returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(0),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        assert!(!probe.run_iteration(0, 0).await.succeeded);
    }

    #[tokio::test]
    async fn recovery_event_is_observed() {
        let mut backend = rest_backend();
        backend.expect_call().returning(|_| Ok(ok_response()));

        let mut breaker = closed_breaker();
        breaker.expect_record().returning(|_| {
            Some(RecoveryEvent {
                tripped_at_ms: 1_000,
                opened_at_ms: 6_001,
                closed_at_ms: 6_051,
            })
        });

        let mut metrics = MockMetricsPort::new();
        metrics
            .expect_observe()
            .withf(|metric, value| {
                *metric == ResilienceMetric::RecoveryTime && (*value - 50.0).abs() < f64::EPSILON
            })
            .times(1)
            .return_const(());
        metrics.expect_increment().never();

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock: fixed_clock(6_051),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        assert!(probe.run_iteration(0, 0).await.succeeded);
    }

    #[tokio::test]
    async fn degraded_window_is_observed() {
        let mut backend = rest_backend();
        backend.expect_call().returning(|_| Ok(ok_response()));

        let mut throughput = MockThroughputPort::new();
        throughput.expect_tick().times(1).return_const(());
        throughput.expect_maybe_roll().returning(|_| {
            Some(ThroughputRoll::Degraded {
                rate: 60.0,
                degradation_pct: 40.0,
            })
        });

        let mut breaker = closed_breaker();
        breaker.expect_record().returning(|_| None);

        let mut metrics = MockMetricsPort::new();
        metrics
            .expect_observe()
            .withf(|metric, value| {
                *metric == ResilienceMetric::ThroughputDegradation
                    && (*value - 40.0).abs() < f64::EPSILON
            })
            .times(1)
            .return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults: no_faults(),
            fallback: unused_fallback(),
            throughput,
            clock: fixed_clock(10_000),
            metrics,
        }
        .into_probe(ProbeSettings::default());

        probe.run_iteration(0, 0).await;
    }

    #[tokio::test]
    async fn elapsed_is_relative_to_construction() {
        let ticks = Arc::new(Counter::new(0));
        let mut clock = MockClockPort::new();
        let counter = Arc::clone(&ticks);
        clock
            .expect_now_ms()
            .returning(move || 1_000 + counter.fetch_add(1, Ordering::SeqCst) * 500);

        let mut faults = MockFaultInjectionPort::new();
        faults
            .expect_should_inject_fault()
            .withf(|elapsed| *elapsed == 1_000)
            .times(1)
            .return_const(false);

        let mut backend = rest_backend();
        backend.expect_call().returning(|_| Ok(ok_response()));
        let mut breaker = closed_breaker();
        breaker.expect_record().returning(|_| None);
        let mut metrics = MockMetricsPort::new();
        metrics.expect_increment().return_const(());

        let probe = Parts {
            backend,
            breaker,
            faults,
            fallback: unused_fallback(),
            throughput: quiet_throughput(),
            clock,
            metrics,
        }
        .into_probe(ProbeSettings::default());

        assert_eq!(probe.started_at_ms(), 1_000);
        probe.run_iteration(0, 0).await;
    }
}
