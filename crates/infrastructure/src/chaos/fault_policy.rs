//! Fault policy definitions

use std::time::Duration;

use domain::FaultWindow;
use serde::{Deserialize, Serialize};

/// When faults are forced during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum FaultPolicy {
    /// Never inject
    Never,
    /// Inject a fixed delay while elapsed time is inside the window
    Window(FaultWindow),
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self::Window(FaultWindow::default())
    }
}

impl FaultPolicy {
    /// Policy that never injects
    pub const fn never() -> Self {
        Self::Never
    }

    /// Whether a fault applies at `elapsed_ms`
    pub const fn applies_at(&self, elapsed_ms: u64) -> bool {
        match self {
            Self::Never => false,
            Self::Window(window) => window.contains(elapsed_ms),
        }
    }

    /// Delay forced onto a faulted call
    pub const fn delay(&self) -> Duration {
        match self {
            Self::Never => Duration::ZERO,
            Self::Window(window) => window.delay(),
        }
    }
}
