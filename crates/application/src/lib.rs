//! Application layer - Use cases and orchestration
//!
//! Contains the port definitions the resilience engine talks through and the
//! services that drive it: the per-iteration probe and the worker pool.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
