//! Fault injector for chaos runs
//!
//! The injector only reports the decision. The caller sleeps for
//! [`FaultInjectionPort::injected_delay`] and still performs the real call.

use std::time::Duration;

use application::ports::FaultInjectionPort;
use serde::{Deserialize, Serialize};

use super::FaultPolicy;

/// Configuration for the fault injector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInjectorConfig {
    /// Whether fault injection is enabled
    pub enabled: bool,
}

impl Default for FaultInjectorConfig {
    fn default() -> Self {
        Self::enabled()
    }
}

impl FaultInjectorConfig {
    /// Create a new config with fault injection enabled
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Create a new config with fault injection disabled
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Time-windowed fault injector
#[derive(Debug, Clone, Copy)]
pub struct FaultInjector {
    config: FaultInjectorConfig,
    policy: FaultPolicy,
}

impl FaultInjector {
    /// Create a new fault injector with the given policy
    pub const fn new(policy: FaultPolicy) -> Self {
        Self {
            config: FaultInjectorConfig::enabled(),
            policy,
        }
    }

    /// Create a new fault injector with custom configuration
    pub const fn with_config(config: FaultInjectorConfig, policy: FaultPolicy) -> Self {
        Self { config, policy }
    }

    /// Create a disabled fault injector (no-op)
    pub const fn disabled() -> Self {
        Self {
            config: FaultInjectorConfig::disabled(),
            policy: FaultPolicy::never(),
        }
    }

    /// Active policy
    pub const fn policy(&self) -> &FaultPolicy {
        &self.policy
    }
}

impl FaultInjectionPort for FaultInjector {
    fn should_inject_fault(&self, elapsed_ms: u64) -> bool {
        self.config.enabled && self.policy.applies_at(elapsed_ms)
    }

    fn injected_delay(&self) -> Duration {
        self.policy.delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::FaultWindow;
    use proptest::prelude::*;

    fn window_injector() -> FaultInjector {
        FaultInjector::new(FaultPolicy::Window(
            FaultWindow::new(30_000, 90_000, 2_000).unwrap(),
        ))
    }

    #[test]
    fn config_default_is_enabled() {
        assert!(FaultInjectorConfig::default().enabled);
        assert!(!FaultInjectorConfig::disabled().enabled);
    }

    #[test]
    fn injects_inside_window() {
        let injector = window_injector();
        assert!(injector.should_inject_fault(45_000));
        assert_eq!(injector.injected_delay(), Duration::from_millis(2_000));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let injector = window_injector();
        assert!(!injector.should_inject_fault(29_999));
        assert!(injector.should_inject_fault(30_000));
        assert!(injector.should_inject_fault(90_000));
        assert!(!injector.should_inject_fault(90_001));
    }

    #[test]
    fn disabled_never_injects() {
        let injector = FaultInjector::disabled();
        for elapsed in [0, 30_000, 45_000, 90_000] {
            assert!(!injector.should_inject_fault(elapsed));
        }
    }

    #[test]
    fn disabled_config_overrides_window() {
        let injector = FaultInjector::with_config(
            FaultInjectorConfig::disabled(),
            FaultPolicy::default(),
        );
        assert!(!injector.should_inject_fault(45_000));
    }

    proptest! {
        #[test]
        fn decision_depends_only_on_elapsed(elapsed in 0_u64..200_000) {
            let injector = window_injector();
            let first = injector.should_inject_fault(elapsed);
            let second = injector.should_inject_fault(elapsed);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first, (30_000..=90_000).contains(&elapsed));
        }
    }
}
