//! Chaos engineering for resilience runs
//!
//! Forces synthetic latency onto backend calls during a configured slice of
//! the test run, so the breaker and fallback paths get exercised.
//!
//! # Overview
//!
//! - `FaultPolicy`: when faults apply, as a function of elapsed test time
//! - `FaultInjector`: answers the probe's per-iteration fault question
//!
//! # Example
//!
//! ```ignore
//! use domain::FaultWindow;
//! use infrastructure::chaos::{FaultInjector, FaultPolicy};
//!
//! let window = FaultWindow::new(30_000, 90_000, 2_000)?;
//! let injector = FaultInjector::new(FaultPolicy::Window(window));
//! assert!(injector.should_inject_fault(45_000));
//! ```

mod fault_injector;
mod fault_policy;

pub use fault_injector::{FaultInjector, FaultInjectorConfig};
pub use fault_policy::FaultPolicy;
