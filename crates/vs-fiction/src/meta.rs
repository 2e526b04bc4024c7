//! Meta commands: help, settings, and toggles.

use tracing::debug;

use crate::error::FictionResult;
use crate::io::Output;
use crate::outcome::Outcome;
use crate::parser::{Arguments, COMMANDS, Command, ParsedCommand};

/// Runs meta commands on behalf of the menu engine.
pub trait MetaHandler {
    /// Perform the command's side effect and return `Meta` or `Quit`.
    fn handle(&mut self, command: &ParsedCommand, output: &mut dyn Output) -> FictionResult<Outcome>;
}

/// Player-adjustable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaSettings {
    /// Show content warnings before chapters.
    pub content_warnings: bool,
    /// Print text character by character.
    pub typewriter: bool,
    /// Play music and sound.
    pub audio: bool,
}

impl Default for MetaSettings {
    fn default() -> Self {
        Self {
            content_warnings: true,
            typewriter: true,
            audio: true,
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

impl MetaSettings {
    /// Create settings with everything on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one setting by its canonical name; returns the new value.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let setting = match name {
            "warnings" => &mut self.content_warnings,
            "typewriter" => &mut self.typewriter,
            "audio" => &mut self.audio,
            _ => return None,
        };
        *setting = !*setting;
        Some(*setting)
    }

    /// One line per setting.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Content warnings: {}", on_off(self.content_warnings)),
            format!("Typewriter effect: {}", on_off(self.typewriter)),
            format!("Audio: {}", on_off(self.audio)),
        ]
    }
}

/// Help text for every command, generated from the command table.
pub fn help_lines() -> Vec<String> {
    COMMANDS
        .iter()
        .filter(|spec| !spec.prefixes.is_empty())
        .map(|spec| format!("{}: {}", spec.command.name().to_uppercase(), spec.description))
        .collect()
}

/// Detailed help for one command.
pub fn command_help(command: Command) -> Vec<String> {
    let spec = command.spec();
    let mut lines = vec![
        format!("{}: {}", command.name().to_uppercase(), spec.description),
        format!("  also: {}", spec.prefixes.join(", ")),
    ];
    if let Arguments::Fixed(groups) = spec.arguments {
        let options: Vec<&str> = groups
            .iter()
            .filter_map(|group| group.first().copied())
            .filter(|argument| !argument.is_empty())
            .collect();
        if !options.is_empty() {
            lines.push(format!("  options: {}", options.join(", ")));
        }
    }
    lines
}

impl MetaHandler for MetaSettings {
    fn handle(&mut self, command: &ParsedCommand, output: &mut dyn Output) -> FictionResult<Outcome> {
        debug!(command = %command.command, argument = %command.argument, "meta command");

        let lines = match command.canonical() {
            Command::Quit => return Ok(Outcome::Quit),
            Command::Help => match Command::from_prefix(&command.argument) {
                Some(target) => command_help(target),
                None => help_lines(),
            },
            Command::Show => match command.argument.as_str() {
                "warnings" => vec![
                    "This game contains depictions of violence, death, and body horror."
                        .to_string(),
                ],
                "achievements" => vec!["No achievements yet.".to_string()],
                _ => self.describe(),
            },
            Command::Settings => self.describe(),
            Command::Toggle => match self.toggle(&command.argument) {
                Some(value) => vec![format!("{} is now {}.", command.argument, on_off(value))],
                None => vec![format!("There is no setting named {}.", command.argument)],
            },
            Command::Reset => {
                *self = Self::default();
                vec!["Settings restored to defaults.".to_string()]
            }
            _ => Vec::new(),
        };

        for line in &lines {
            output.write_line(line)?;
        }
        Ok(Outcome::Meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Transcript;
    use crate::parser::parse_command;

    fn run(settings: &mut MetaSettings, input: &str) -> (Outcome, Vec<String>) {
        let mut transcript = Transcript::new();
        let outcome = settings
            .handle(&parse_command(input).unwrap(), &mut transcript)
            .unwrap();
        let written = transcript.written().into_iter().map(str::to_string).collect();
        (outcome, written)
    }

    #[test]
    fn toggle_and_reset() {
        let mut settings = MetaSettings::new();
        let (outcome, written) = run(&mut settings, "toggle typewriter");
        assert_eq!(outcome, Outcome::Meta);
        assert!(!settings.typewriter);
        assert_eq!(written, vec!["typewriter is now off."]);

        run(&mut settings, "reset settings");
        assert_eq!(settings, MetaSettings::default());
    }

    #[test]
    fn quit_is_not_meta_outcome() {
        let mut settings = MetaSettings::new();
        assert_eq!(run(&mut settings, "exit").0, Outcome::Quit);
    }

    #[test]
    fn help_lists_prefixed_commands() {
        let lines = help_lines();
        assert_eq!(lines.len(), COMMANDS.iter().filter(|s| !s.prefixes.is_empty()).count());
        assert!(lines.iter().any(|l| l.starts_with("APPROACH:")));
    }

    #[test]
    fn help_for_one_command() {
        let mut settings = MetaSettings::new();
        let (_, written) = run(&mut settings, "help toss");
        insta::assert_snapshot!(written.join("\n"), @r"
        THROW: throw the blade
          also: throw, toss
          options: blade, blade out the window
        ");
    }

    #[test]
    fn show_settings() {
        let mut settings = MetaSettings::new();
        settings.toggle("audio");
        let (_, written) = run(&mut settings, "view settings");
        assert_eq!(written[2], "Audio: off");
    }
}
