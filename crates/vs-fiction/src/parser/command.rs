//! The command table and command parsing for player input.

use std::fmt;

use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use super::suggest::suggest_prefix;

/// Accepted as an argument when nothing follows the verb.
pub const BLANK: &str = "";

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Command {
    /// Print help for all commands or one command.
    Help,
    /// Show warnings, settings, or achievements.
    Show,
    /// Show the settings.
    Settings,
    /// Toggle a setting.
    Toggle,
    /// Reset the settings.
    Reset,
    /// Move in a direction.
    Go,
    /// A bare direction, as `go <direction>`.
    DirectGo,
    /// Page through the gallery.
    Gallery,
    /// A bare gallery keyword, as `gallery <keyword>`.
    DirectGallery,
    /// Take the blade.
    Take,
    /// Drop the blade.
    Drop,
    /// Throw the blade.
    Throw,
    /// Slay someone.
    Slay,
    /// Approach something.
    Approach,
    /// Leave the game.
    Quit,
}

/// Arguments a command accepts.
#[derive(Debug, Clone, Copy)]
pub enum Arguments {
    /// Synonym groups; the first entry of each group is its canonical form.
    Fixed(&'static [&'static [&'static str]]),
    /// Blank, or the prefix of any command in the table.
    CommandName,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// The command.
    pub command: Command,
    /// Verb prefixes and synonyms; empty for bare-keyword forms.
    pub prefixes: &'static [&'static str],
    /// Human description, shown by `help`.
    pub description: &'static str,
    /// Whether this is a meta command.
    pub meta: bool,
    /// Accepted arguments.
    pub arguments: Arguments,
}

const DIRECTIONS: &[&[&str]] = &[
    &["forward"],
    &["back", "backward"],
    &["left"],
    &["right"],
    &["up"],
    &["down"],
    &["in", "inside"],
    &["out", "outside"],
];

const GALLERY_KEYWORDS: &[&[&str]] = &[&["next"], &["prev", "previous"], &["first"], &["last"]];

const BLADE: &[&str] = &["blade", "the blade"];
const PRINCESS: &[&str] = &["princess", "the princess"];

/// The full command vocabulary, in help order.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: Command::Help,
        prefixes: &["help", "commands"],
        description: "list commands, or explain one",
        meta: true,
        arguments: Arguments::CommandName,
    },
    CommandSpec {
        command: Command::Show,
        prefixes: &["show", "view"],
        description: "show content warnings, settings, or achievements",
        meta: true,
        arguments: Arguments::Fixed(&[
            &["warnings", "content warnings"],
            &["settings"],
            &["achievements"],
        ]),
    },
    CommandSpec {
        command: Command::Settings,
        prefixes: &["settings", "options"],
        description: "show the current settings",
        meta: true,
        arguments: Arguments::Fixed(&[&[BLANK]]),
    },
    CommandSpec {
        command: Command::Toggle,
        prefixes: &["toggle"],
        description: "toggle content warnings, the typewriter effect, or audio",
        meta: true,
        arguments: Arguments::Fixed(&[&["warnings"], &["typewriter"], &["audio"]]),
    },
    CommandSpec {
        command: Command::Reset,
        prefixes: &["reset"],
        description: "restore default settings",
        meta: true,
        arguments: Arguments::Fixed(&[&["settings"]]),
    },
    CommandSpec {
        command: Command::Go,
        prefixes: &["go", "walk", "move"],
        description: "move in a direction",
        meta: false,
        arguments: Arguments::Fixed(DIRECTIONS),
    },
    CommandSpec {
        command: Command::DirectGo,
        prefixes: &[],
        description: "move in a direction",
        meta: false,
        arguments: Arguments::Fixed(DIRECTIONS),
    },
    CommandSpec {
        command: Command::Gallery,
        prefixes: &["gallery"],
        description: "browse the gallery",
        meta: false,
        arguments: Arguments::Fixed(&[&[BLANK], &["next"], &["prev", "previous"], &["first"], &["last"]]),
    },
    CommandSpec {
        command: Command::DirectGallery,
        prefixes: &[],
        description: "browse the gallery",
        meta: false,
        arguments: Arguments::Fixed(GALLERY_KEYWORDS),
    },
    CommandSpec {
        command: Command::Take,
        prefixes: &["take", "get", "grab"],
        description: "take the blade",
        meta: false,
        arguments: Arguments::Fixed(&[BLADE]),
    },
    CommandSpec {
        command: Command::Drop,
        prefixes: &["drop"],
        description: "drop the blade",
        meta: false,
        arguments: Arguments::Fixed(&[BLADE]),
    },
    CommandSpec {
        command: Command::Throw,
        prefixes: &["throw", "toss"],
        description: "throw the blade",
        meta: false,
        arguments: Arguments::Fixed(&[
            BLADE,
            &["blade out the window", "the blade out the window"],
        ]),
    },
    CommandSpec {
        command: Command::Slay,
        prefixes: &["slay", "kill"],
        description: "slay the princess, or yourself",
        meta: false,
        arguments: Arguments::Fixed(&[PRINCESS, &["self", "yourself"]]),
    },
    CommandSpec {
        command: Command::Approach,
        prefixes: &["approach"],
        description: "approach the mirror or the princess",
        meta: false,
        arguments: Arguments::Fixed(&[&["mirror", "the mirror"], PRINCESS]),
    },
    CommandSpec {
        command: Command::Quit,
        prefixes: &["quit", "exit"],
        description: "leave the game",
        meta: true,
        arguments: Arguments::Fixed(&[&[BLANK]]),
    },
];

impl Command {
    /// This command's row in the table.
    pub fn spec(self) -> &'static CommandSpec {
        COMMANDS
            .iter()
            .find(|spec| spec.command == self)
            .unwrap_or(&COMMANDS[0])
    }

    /// The prefixed command a bare-keyword form stands for.
    pub fn canonical(self) -> Command {
        match self {
            Command::DirectGo => Command::Go,
            Command::DirectGallery => Command::Gallery,
            other => other,
        }
    }

    /// Whether this is a meta command.
    pub fn is_meta(self) -> bool {
        self.spec().meta
    }

    /// The primary prefix, used as the display name.
    pub fn name(self) -> &'static str {
        self.canonical().spec().prefixes.first().copied().unwrap_or(BLANK)
    }

    /// Find the command whose prefixes include `verb`.
    pub fn from_prefix(verb: &str) -> Option<Command> {
        COMMANDS
            .iter()
            .find(|spec| spec.prefixes.contains(&verb))
            .map(|spec| spec.command)
    }

    /// Canonicalize an argument, if this command accepts it.
    ///
    /// `argument` must already be lowercase with single spaces.
    pub fn accept(self, argument: &str) -> Option<String> {
        match self.spec().arguments {
            Arguments::Fixed(groups) => groups
                .iter()
                .find(|group| group.contains(&argument))
                .map(|group| group[0].to_string()),
            Arguments::CommandName => {
                if argument.is_empty() {
                    Some(String::new())
                } else {
                    Command::from_prefix(argument).map(|c| c.name().to_string())
                }
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The command as resolved, including bare-keyword forms.
    pub command: Command,
    /// The canonical argument; empty when blank.
    pub argument: String,
}

impl ParsedCommand {
    /// The command with bare-keyword forms folded into their prefixed form.
    pub fn canonical(&self) -> Command {
        self.command.canonical()
    }

    /// Whether the parsed command is a meta command.
    pub fn is_meta(&self) -> bool {
        self.command.is_meta()
    }
}

/// Why input did not parse as a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input was blank.
    #[error("empty input")]
    Empty,

    /// The first word is not a command.
    #[error("unrecognized command: {input}")]
    UnrecognizedCommand {
        /// The normalized input.
        input: String,
        /// The closest command prefix, if any is close enough.
        suggestion: Option<&'static str>,
    },

    /// The command does not accept the argument.
    #[error("{command} does not accept \"{argument}\"")]
    UnrecognizedArgument {
        /// The command that was recognized.
        command: Command,
        /// The rejected argument.
        argument: String,
    },
}

/// Parse one line of player input into a command.
pub fn parse_command(input: &str) -> Result<ParsedCommand, ParseError> {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let Some((&verb, rest)) = words.split_first() else {
        return Err(ParseError::Empty);
    };
    let normalized = words.join(" ");

    // Bare directions and gallery keywords take precedence over prefixes
    let bare = [Command::DirectGo, Command::DirectGallery]
        .into_iter()
        .find(|c| c.accept(verb).is_some());
    if let Some(command) = bare {
        return resolve_argument(command, &normalized);
    }

    match Command::from_prefix(verb) {
        Some(command) => resolve_argument(command, &rest.join(" ")),
        None => Err(ParseError::UnrecognizedCommand {
            suggestion: suggest_prefix(verb),
            input: normalized,
        }),
    }
}

fn resolve_argument(command: Command, argument: &str) -> Result<ParsedCommand, ParseError> {
    command
        .accept(argument)
        .map(|argument| ParsedCommand { command, argument })
        .ok_or_else(|| ParseError::UnrecognizedArgument {
            command,
            argument: argument.to_string(),
        })
}

/// Every prefix in the table.
pub fn all_prefixes() -> impl Iterator<Item = &'static str> {
    Command::iter().flat_map(|c| c.spec().prefixes.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(command: Command, argument: &str) -> Result<ParsedCommand, ParseError> {
        Ok(ParsedCommand {
            command,
            argument: argument.to_string(),
        })
    }

    #[test]
    fn every_command_has_a_row() {
        for command in Command::iter() {
            assert_eq!(command.spec().command, command);
        }
    }

    #[test]
    fn prefixes_do_not_collide() {
        let mut seen = std::collections::HashSet::new();
        for prefix in all_prefixes() {
            assert!(seen.insert(prefix), "duplicate prefix {prefix}");
        }
    }

    #[test]
    fn bare_direction() {
        assert_eq!(parse_command("forward"), parsed(Command::DirectGo, "forward"));
        assert_eq!(parse_command("Outside"), parsed(Command::DirectGo, "out"));
    }

    #[test]
    fn bare_direction_matches_go() {
        let bare = parse_command("forward").unwrap();
        let go = parse_command("go forward").unwrap();
        assert_eq!(bare.canonical(), go.canonical());
        assert_eq!(bare.argument, go.argument);
    }

    #[test]
    fn bare_gallery_keyword() {
        assert_eq!(parse_command("previous"), parsed(Command::DirectGallery, "prev"));
        assert_eq!(parse_command("gallery"), parsed(Command::Gallery, ""));
    }

    #[test]
    fn verb_synonyms() {
        assert_eq!(parse_command("view warnings"), parsed(Command::Show, "warnings"));
        assert_eq!(parse_command("get the blade"), parsed(Command::Take, "blade"));
        assert_eq!(
            parse_command("toss  the blade out the   window"),
            parsed(Command::Throw, "blade out the window")
        );
        assert_eq!(parse_command("kill yourself"), parsed(Command::Slay, "self"));
        assert_eq!(parse_command("walk back"), parsed(Command::Go, "back"));
    }

    #[test]
    fn help_accepts_command_names() {
        assert_eq!(parse_command("help"), parsed(Command::Help, ""));
        assert_eq!(parse_command("help toss"), parsed(Command::Help, "throw"));
        assert!(matches!(
            parse_command("help dance"),
            Err(ParseError::UnrecognizedArgument { .. })
        ));
    }

    #[test]
    fn blank_sentinel() {
        assert_eq!(parse_command("quit"), parsed(Command::Quit, ""));
        assert!(matches!(
            parse_command("quit now"),
            Err(ParseError::UnrecognizedArgument {
                command: Command::Quit,
                ..
            })
        ));
        assert!(matches!(
            parse_command("take"),
            Err(ParseError::UnrecognizedArgument {
                command: Command::Take,
                ..
            })
        ));
    }

    #[test]
    fn unrecognized_command_with_suggestion() {
        assert_eq!(
            parse_command("approch mirror"),
            Err(ParseError::UnrecognizedCommand {
                input: "approch mirror".to_string(),
                suggestion: Some("approach"),
            })
        );
        assert_eq!(
            parse_command("xyzzy"),
            Err(ParseError::UnrecognizedCommand {
                input: "xyzzy".to_string(),
                suggestion: None,
            })
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
    }

    #[test]
    fn bare_keyword_with_trailing_words_is_rejected() {
        assert_eq!(
            parse_command("forward quickly"),
            Err(ParseError::UnrecognizedArgument {
                command: Command::DirectGo,
                argument: "forward quickly".to_string(),
            })
        );
    }

    #[test]
    fn meta_flags() {
        assert!(Command::Help.is_meta());
        assert!(Command::Quit.is_meta());
        assert!(!Command::Go.is_meta());
        assert!(!Command::DirectGo.is_meta());
    }
}
