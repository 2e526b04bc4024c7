//! Command parsing and suggestions.

mod command;
mod suggest;

pub use command::{
    Arguments, BLANK, COMMANDS, Command, CommandSpec, ParseError, ParsedCommand, all_prefixes,
    parse_command,
};
pub use suggest::{fuzzy_match, suggest_prefix};
