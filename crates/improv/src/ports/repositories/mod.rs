//! Repository Ports
//!
//! Abstract interfaces for artifact and metadata persistence.

mod artifact_repository;
mod generation_log_repository;
mod seed_repository;

pub use artifact_repository::*;
pub use generation_log_repository::*;
pub use seed_repository::*;
