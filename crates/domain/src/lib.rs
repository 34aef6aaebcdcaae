//! Domain layer for the resilience simulator
//!
//! Contains the circuit breaker vocabulary, result samples, fault windows
//! and throughput windows shared by every other layer.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
