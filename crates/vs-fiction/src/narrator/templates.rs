//! Template registry for rebuff text.

use crate::config::{MenuConfig, RebuffTexts};
use crate::parser::{Command, ParseError};

/// Whether a narrator-type speaker is around to deliver a rebuff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Narration {
    /// A narrator is present.
    Narrated,
    /// No narrator, or a meta menu.
    #[default]
    Unnarrated,
}

/// Why the menu is rebuffing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebuff {
    /// The input did not parse as a command.
    Unrecognized(ParseError),
    /// A recognized command the menu does not accept.
    Unavailable(Command),
    /// A number outside the available range.
    OutOfRange {
        /// The number entered.
        choice: i64,
        /// How many options are available.
        count: usize,
    },
}

impl Rebuff {
    /// Whether a menu's custom rebuff replaces this text.
    pub fn is_free_text(&self) -> bool {
        !matches!(self, Rebuff::OutOfRange { .. })
    }
}

/// Registry of rebuff templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    config: MenuConfig,
}

impl TemplateRegistry {
    /// Create a new template registry with the given config.
    pub fn new(config: MenuConfig) -> Self {
        Self { config }
    }

    /// The menu configuration.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    fn texts(&self, narration: Narration) -> &RebuffTexts {
        match narration {
            Narration::Narrated => &self.config.narrated,
            Narration::Unnarrated => &self.config.unnarrated,
        }
    }

    /// Text for a rebuff; `custom` replaces free-text rebuffs only.
    pub fn rebuff(&self, rebuff: &Rebuff, narration: Narration, custom: Option<&str>) -> String {
        if let Some(custom) = custom
            && rebuff.is_free_text()
        {
            return custom.to_string();
        }

        let texts = self.texts(narration);
        match rebuff {
            Rebuff::Unrecognized(ParseError::UnrecognizedCommand {
                suggestion: Some(suggestion),
                ..
            }) => {
                let hint = texts.suggestion.replace("{suggestion}", suggestion);
                format!("{}{hint}", texts.unrecognized)
            }
            Rebuff::Unrecognized(_) => texts.unrecognized.clone(),
            Rebuff::Unavailable(_) => texts.unavailable.clone(),
            Rebuff::OutOfRange { count, .. } => {
                texts.out_of_range.replace("{count}", &count.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unrecognized(suggestion: Option<&'static str>) -> Rebuff {
        Rebuff::Unrecognized(ParseError::UnrecognizedCommand {
            input: "x".to_string(),
            suggestion,
        })
    }

    #[test]
    fn narration_selects_texts() {
        let registry = TemplateRegistry::default();
        let rebuff = Rebuff::Unavailable(Command::Take);
        assert_eq!(
            registry.rebuff(&rebuff, Narration::Narrated, None),
            RebuffTexts::narrated().unavailable
        );
        assert_eq!(
            registry.rebuff(&rebuff, Narration::Unnarrated, None),
            RebuffTexts::unnarrated().unavailable
        );
    }

    #[test]
    fn suggestion_is_appended() {
        let registry = TemplateRegistry::default();
        assert_eq!(
            registry.rebuff(&unrecognized(Some("throw")), Narration::Unnarrated, None),
            "Unrecognized command. Did you mean \"throw\"?"
        );
        assert_eq!(
            registry.rebuff(&unrecognized(None), Narration::Unnarrated, None),
            "Unrecognized command."
        );
    }

    #[test]
    fn out_of_range_counts() {
        let registry = TemplateRegistry::default();
        let rebuff = Rebuff::OutOfRange { choice: 7, count: 3 };
        insta::assert_snapshot!(
            registry.rebuff(&rebuff, Narration::Unnarrated, None),
            @"Please enter a number from 1 to 3."
        );
    }

    #[test]
    fn custom_rebuff_replaces_free_text_only() {
        let registry = TemplateRegistry::default();
        let custom = Some("Not now.");
        assert_eq!(
            registry.rebuff(&unrecognized(None), Narration::Narrated, custom),
            "Not now."
        );
        assert_eq!(
            registry.rebuff(&Rebuff::Unavailable(Command::Go), Narration::Narrated, custom),
            "Not now."
        );
        assert_eq!(
            registry.rebuff(&Rebuff::OutOfRange { choice: 0, count: 2 }, Narration::Narrated, custom),
            "There are only 2 options in front of you."
        );
    }
}
