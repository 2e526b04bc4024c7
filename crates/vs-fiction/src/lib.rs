//! Interactive fiction engine for Vessel.
//!
//! Runs validated scripts against a [`vs_core::NarrativeContext`], parses
//! player commands against a fixed vocabulary, and resolves options menus
//! into structured [`Outcome`]s. All input and output goes through small
//! traits so scenes can be driven by a terminal or by a fixed transcript.

/// Options menus and their options.
pub mod choice;
/// Runtime and menu configuration.
pub mod config;
/// Error types for the fiction engine.
pub mod error;
/// Console input, output, and line presentation.
pub mod io;
/// Meta commands and player settings.
pub mod meta;
/// Narrator-dependent rebuff text.
pub mod narrator;
/// Gameplay outcomes and scene affordances.
pub mod outcome;
/// Command table and command parsing.
pub mod parser;
/// Script execution.
pub mod runtime;
/// The options menu resolution loop.
pub mod session;

pub use choice::{MenuOption, OptionsMenu, Visibility};
pub use config::{MenuConfig, RebuffTexts, RuntimeConfig};
pub use error::{FictionError, FictionResult, MenuError, RuntimeDefect};
pub use io::{Input, Output, PresentedLine, Presenter, ScriptedInput, StdConsole, Transcript};
pub use meta::{MetaHandler, MetaSettings};
pub use outcome::{Affordances, CommandStatus, Outcome};
pub use parser::{Command, ParseError, ParsedCommand, parse_command};
pub use runtime::{Cursor, RunOutcome, Runtime, StartAt};
pub use session::MenuSession;
