//! Simulation configuration
//!
//! Loaded in layers: built-in defaults, then an optional TOML file, then
//! `RESILIENCE_SIM_*` environment variables (`__` separates sections, e.g.
//! `RESILIENCE_SIM_BREAKER__FAILURE_THRESHOLD=3`). Unknown keys are ignored.

mod sections;

use std::path::Path;
use std::time::Duration;

use application::{LoadSettings, ProbeSettings};
use domain::{BreakerConfig, FaultWindow};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::adapters::FallbackConfig;
use crate::chaos::{FaultInjector, FaultInjectorConfig, FaultPolicy};
use crate::http::HttpClientConfig;
use crate::telemetry::TelemetryConfig;

pub use sections::{
    BackendSection, BreakerSection, FaultWindowSection, MetricsSection, TelemetrySection,
};

/// Default configuration file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "resilience";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "RESILIENCE_SIM";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// One or more values violate an invariant
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete configuration of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Concurrent workers (default: 500)
    #[serde(default = "default_vus")]
    pub vus: u32,

    /// Run length in seconds (default: 120)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Grace period for in-flight iterations in seconds (default: 30)
    #[serde(default = "default_graceful_stop")]
    pub graceful_stop_secs: u64,

    /// Pause between iterations of one worker in milliseconds (default: 100)
    #[serde(default = "default_iteration_pause")]
    pub iteration_pause_ms: u64,

    /// Successful calls slower than this are failures (default: 10000)
    #[serde(default = "default_slow_call_threshold")]
    pub slow_call_threshold_ms: u64,

    /// Throughput monitoring window in milliseconds (default: 10000)
    #[serde(default = "default_throughput_window")]
    pub throughput_window_ms: u64,

    #[serde(default)]
    pub breaker: BreakerSection,

    #[serde(default)]
    pub fault_window: FaultWindowSection,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub telemetry: TelemetrySection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

const fn default_vus() -> u32 {
    500
}

const fn default_duration() -> u64 {
    120
}

const fn default_graceful_stop() -> u64 {
    30
}

const fn default_iteration_pause() -> u64 {
    100
}

const fn default_slow_call_threshold() -> u64 {
    10_000
}

const fn default_throughput_window() -> u64 {
    10_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vus: default_vus(),
            duration_secs: default_duration(),
            graceful_stop_secs: default_graceful_stop(),
            iteration_pause_ms: default_iteration_pause(),
            slow_call_threshold_ms: default_slow_call_threshold(),
            throughput_window_ms: default_throughput_window(),
            breaker: BreakerSection::default(),
            fault_window: FaultWindowSection::default(),
            fallback: FallbackConfig::default(),
            backend: BackendSection::default(),
            telemetry: TelemetrySection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from defaults, file and environment
    ///
    /// With `path`, that file must exist. Without it, `resilience.toml` in
    /// the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let loaded: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        debug!(vus = loaded.vus, base_url = %loaded.backend.base_url, "Configuration loaded");
        Ok(loaded)
    }

    /// Check every invariant and report all violations together
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if let Err(e) = BreakerConfig::from(self.breaker).validate() {
            problems.push(e.to_string());
        }
        if self.vus == 0 {
            problems.push("vus must be greater than 0".to_string());
        }
        if self.throughput_window_ms == 0 {
            problems.push("throughput_window_ms must be greater than 0".to_string());
        }
        if self.fault_window.start_offset_ms > self.fault_window.end_offset_ms {
            problems.push(format!(
                "fault_window.start_offset_ms ({}) must not exceed end_offset_ms ({})",
                self.fault_window.start_offset_ms, self.fault_window.end_offset_ms
            ));
        }
        if self.backend.base_url.trim().is_empty() {
            problems.push("backend.base_url must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Breaker thresholds
    pub fn breaker_config(&self) -> BreakerConfig {
        self.breaker.into()
    }

    /// Fault injector for this run
    pub fn fault_injector(&self) -> Result<FaultInjector, ConfigError> {
        let section = self.fault_window;
        let window = FaultWindow::new(section.start_offset_ms, section.end_offset_ms, section.delay_ms)
            .map_err(|e| ConfigError::Invalid(vec![e.to_string()]))?;
        let config = if section.enabled {
            FaultInjectorConfig::enabled()
        } else {
            FaultInjectorConfig::disabled()
        };
        Ok(FaultInjector::with_config(config, FaultPolicy::Window(window)))
    }

    /// Probe classification settings
    pub const fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            slow_call_threshold_ms: self.slow_call_threshold_ms,
            call_timeout: Duration::from_millis(self.backend.call_timeout_ms),
        }
    }

    /// Worker pool settings
    pub const fn load_settings(&self) -> LoadSettings {
        LoadSettings {
            vus: self.vus,
            duration: Duration::from_secs(self.duration_secs),
            graceful_stop: Duration::from_secs(self.graceful_stop_secs),
            iteration_pause: Duration::from_millis(self.iteration_pause_ms),
        }
    }

    /// HTTP client settings for the backends
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::default().with_timeout(Duration::from_millis(self.backend.call_timeout_ms))
    }

    /// Reconnect deadline
    pub const fn reconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.reconnect_timeout_ms)
    }

    /// Subscriber settings
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_filter: self.telemetry.log_filter.clone(),
            json: self.telemetry.json,
        }
    }
}
