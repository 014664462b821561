//! Domain Services
//!
//! Pure functions and immutable lookups shared by the use cases.

mod naming;
mod prompt_builder;
mod template_store;

pub use naming::*;
pub use prompt_builder::*;
pub use template_store::*;
