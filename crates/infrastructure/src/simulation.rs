//! Wiring of one protocol's resilience engine from configuration

use std::sync::Arc;

use application::ports::{ClockPort, MetricsPort};
use application::{ApplicationError, ProbePorts, ResilienceProbe};
use domain::Protocol;

use crate::adapters::{
    CircuitBreaker, FallbackResponder, HttpBackend, MetricsRecorder, ThroughputMonitor,
};
use crate::config::SimulationConfig;
use crate::http::ConnectionSlot;

/// Build a probe for `protocol` with fresh breaker, monitor and recorder
pub fn build_probe(
    config: &SimulationConfig,
    protocol: Protocol,
    clock: Arc<dyn ClockPort>,
) -> Result<ResilienceProbe, ApplicationError> {
    let slot = Arc::new(ConnectionSlot::new(
        config.http_client_config(),
        config.reconnect_timeout(),
    )?);
    let metrics: Arc<dyn MetricsPort> = Arc::new(MetricsRecorder::for_protocol(protocol));
    let faults = config
        .fault_injector()
        .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

    let ports = ProbePorts {
        backend: Arc::new(HttpBackend::new(protocol, &config.backend.base_url, slot)),
        breaker: Arc::new(CircuitBreaker::new(
            protocol.to_string(),
            config.breaker_config(),
            Arc::clone(&clock),
        )),
        faults: Arc::new(faults),
        fallback: Arc::new(FallbackResponder::new(
            protocol,
            config.fallback.clone(),
            Arc::clone(&clock),
            Arc::clone(&metrics),
        )),
        throughput: Arc::new(ThroughputMonitor::new(config.throughput_window_ms, &clock)),
        clock,
        metrics,
    };

    Ok(ResilienceProbe::new(ports, config.probe_settings()))
}
