//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod generation_mode;
mod image_settings;
mod seed;
mod voice_settings;

pub use generation_mode::*;
pub use image_settings::*;
pub use seed::*;
pub use voice_settings::*;
