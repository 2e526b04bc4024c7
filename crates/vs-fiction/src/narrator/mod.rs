//! Narrator-dependent rebuff text.

mod templates;

pub use templates::{Narration, Rebuff, TemplateRegistry};
