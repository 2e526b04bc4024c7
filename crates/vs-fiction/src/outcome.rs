//! Structured outcomes of menu resolution.

use std::collections::HashMap;

use vs_core::{BladeState, NarrativeContext};

use crate::parser::{Command, ParsedCommand};

/// How a gameplay command fared in the current scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    /// The command does what it says.
    Success,
    /// The thing the command refers to is not here.
    TargetAbsent,
    /// The target is here, but narrative state forbids the action.
    PreconditionUnmet,
    /// The scene does not allow this action right now.
    Disallowed,
}

/// The single result of one menu call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A numbered option was chosen; carries the option id.
    Option(String),
    /// A meta command ran; the caller should re-show the menu.
    Meta,
    /// The player asked to leave.
    Quit,
    /// A gameplay command was entered in a non-exclusive menu.
    Command {
        /// The command, with bare-keyword forms folded in.
        command: Command,
        /// The canonical argument.
        argument: String,
        /// Result of the command in the current scene.
        status: CommandStatus,
    },
}

impl Outcome {
    /// The chosen option id, if an option was chosen.
    pub fn option_id(&self) -> Option<&str> {
        match self {
            Outcome::Option(id) => Some(id),
            _ => None,
        }
    }
}

/// What each gameplay command does in the current scene.
///
/// Missing entries default to `TargetAbsent` for movement and the gallery,
/// and to `Disallowed` for everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affordances {
    entries: HashMap<(Command, String), CommandStatus>,
}

impl Affordances {
    /// A scene that affords nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the status of a command with a canonical argument.
    pub fn with(mut self, command: Command, argument: impl Into<String>, status: CommandStatus) -> Self {
        self.set(command, argument, status);
        self
    }

    /// Declare the status of a command with a canonical argument.
    pub fn set(&mut self, command: Command, argument: impl Into<String>, status: CommandStatus) {
        self.entries
            .insert((command.canonical(), argument.into()), status);
    }

    /// Resolve the status of a parsed command against narrative state.
    pub fn status(&self, parsed: &ParsedCommand, ctx: &NarrativeContext) -> CommandStatus {
        let command = parsed.canonical();
        let declared = self
            .entries
            .get(&(command, parsed.argument.clone()))
            .copied()
            .unwrap_or(match command {
                Command::Go | Command::Gallery => CommandStatus::TargetAbsent,
                _ => CommandStatus::Disallowed,
            });

        if declared == CommandStatus::Success && !precondition_holds(command, ctx) {
            return CommandStatus::PreconditionUnmet;
        }
        declared
    }

    /// The outcome a non-exclusive menu returns for a parsed command.
    pub fn outcome(&self, parsed: &ParsedCommand, ctx: &NarrativeContext) -> Outcome {
        Outcome::Command {
            command: parsed.canonical(),
            argument: parsed.argument.clone(),
            status: self.status(parsed, ctx),
        }
    }
}

fn precondition_holds(command: Command, ctx: &NarrativeContext) -> bool {
    let held = ctx.blade == BladeState::Held;
    match command {
        Command::Take => !held,
        Command::Drop | Command::Throw | Command::Slay => held,
        _ => true,
    }
}
