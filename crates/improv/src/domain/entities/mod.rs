//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - CharacterTemplate: cast member description used for prompts
//! - ShotSpec / DialogueLine: planned units of an episode
//! - Voice: speech voices, design briefs and previews
//! - Generation: service requests and results
//! - Payload: artifact content awaiting persistence
//! - Record: generation log entries and the seed registry

mod character;
mod dialogue;
mod generation;
mod payload;
mod record;
mod shot;
mod voice;

pub use character::*;
pub use dialogue::*;
pub use generation::*;
pub use payload::*;
pub use record::*;
pub use shot::*;
pub use voice::*;
