//! Runtime and menu configuration.

use serde::Deserialize;

/// Settings for the script runtime, loaded from `[runtime]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for `pause` ranges.
    pub seed: u64,
    /// Wait for acknowledgement after lines without `interrupt`.
    pub wait: bool,
    /// Multiplier applied to every pause duration.
    pub pause_scale: f64,
    /// Maximum lines executed per run; 0 disables the limit.
    pub step_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            wait: true,
            pause_scale: 1.0,
            step_limit: 100_000,
        }
    }
}

impl RuntimeConfig {
    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether lines wait for acknowledgement.
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Set the pause multiplier.
    pub fn with_pause_scale(mut self, scale: f64) -> Self {
        self.pause_scale = scale.max(0.0);
        self
    }

    /// Set the step limit.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }
}

/// Rebuff texts for one narration mode.
///
/// `{count}` expands to the number of available options and `{suggestion}`
/// to a suggested command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RebuffTexts {
    /// Input that is not a command.
    pub unrecognized: String,
    /// Appended to `unrecognized` when a close command exists.
    pub suggestion: String,
    /// A recognized command the menu does not accept.
    pub unavailable: String,
    /// A number outside `1..=count`.
    pub out_of_range: String,
}

impl RebuffTexts {
    /// Defaults spoken by a narrator.
    pub fn narrated() -> Self {
        Self {
            unrecognized: "That isn't something you can do.".to_string(),
            suggestion: " Perhaps you meant \"{suggestion}\"?".to_string(),
            unavailable: "Now isn't the time for that. Make a choice.".to_string(),
            out_of_range: "There are only {count} options in front of you.".to_string(),
        }
    }

    /// Defaults for menus without a narrator.
    pub fn unnarrated() -> Self {
        Self {
            unrecognized: "Unrecognized command.".to_string(),
            suggestion: " Did you mean \"{suggestion}\"?".to_string(),
            unavailable: "That command is not available here.".to_string(),
            out_of_range: "Please enter a number from 1 to {count}.".to_string(),
        }
    }
}

impl Default for RebuffTexts {
    fn default() -> Self {
        Self::unnarrated()
    }
}

/// Settings for menu rendering and rebuffs, loaded from `[menu]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Format of an option line; `{marker}` and `{text}` expand.
    pub option_format: String,
    /// Marker shown in place of a number for greyed options.
    pub greyed_marker: String,
    /// Rebuffs when a narrator is present.
    pub narrated: RebuffTexts,
    /// Rebuffs when no narrator is present, and for meta menus.
    pub unnarrated: RebuffTexts,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            option_format: "({marker}) {text}".to_string(),
            greyed_marker: "X".to_string(),
            narrated: RebuffTexts::narrated(),
            unnarrated: RebuffTexts::unnarrated(),
        }
    }
}

impl MenuConfig {
    /// Set the option line format.
    pub fn with_option_format(mut self, format: impl Into<String>) -> Self {
        self.option_format = format.into();
        self
    }

    /// Set the greyed placeholder.
    pub fn with_greyed_marker(mut self, marker: impl Into<String>) -> Self {
        self.greyed_marker = marker.into();
        self
    }

    /// Set the narrated rebuffs.
    pub fn with_narrated(mut self, texts: RebuffTexts) -> Self {
        self.narrated = texts;
        self
    }

    /// Set the unnarrated rebuffs.
    pub fn with_unnarrated(mut self, texts: RebuffTexts) -> Self {
        self.unnarrated = texts;
        self
    }

    /// Format one option line.
    pub fn format_option(&self, marker: &str, text: &str) -> String {
        self.option_format
            .replace("{marker}", marker)
            .replace("{text}", text)
    }
}
