//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the domain layer
//! interacts with external systems (generation services, storage).
//!
//! Implementations of these traits live in `improv-pipeline`.

pub mod repositories;
pub mod services;

// Re-exports
pub use repositories::*;
pub use services::*;
