//! Service Ports
//!
//! Abstract interfaces for the remote generation services.

mod image_generator;
mod speech_synthesizer;

pub use image_generator::*;
pub use speech_synthesizer::*;
