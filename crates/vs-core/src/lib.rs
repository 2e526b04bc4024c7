//! Core types for Vessel: personas, speakers, and the narrative context.
//!
//! This crate holds the state that chapter logic owns and that both the
//! script runtime and the options menu engine read. It has no knowledge of
//! script syntax; you can build a [`NarrativeContext`] programmatically and
//! evaluate [`Condition`]s against it.

/// Composable conditions evaluated against the narrative context.
pub mod condition;
/// The mutable narrative state shared by the runtime and the menu engine.
pub mod context;
/// Error types used throughout the crate.
pub mod error;
/// Personas, persona sets, narrators, and speakers.
pub mod persona;

/// Re-export condition types.
pub use condition::Condition;
/// Re-export context types.
pub use context::{BladeState, NarrativeContext, StoryFlag};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export persona types.
pub use persona::{Narrator, Persona, PersonaSet, Speaker};
