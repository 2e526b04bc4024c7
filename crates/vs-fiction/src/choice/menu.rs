//! Options menus: option state, numbering, and picks.

use tracing::debug;
use vs_core::NarrativeContext;

use super::option::{MenuOption, OptionState};
use crate::config::MenuConfig;

/// One shown option in a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOption {
    /// The option id.
    pub id: String,
    /// The 1-based number, or `None` if greyed.
    pub number: Option<usize>,
    /// Display text with placeholders filled in.
    pub text: String,
}

/// An ordered set of options plus the rules for free-text input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsMenu {
    options: Vec<MenuOption>,
    exclusive: bool,
    meta: bool,
    rebuff: Option<String>,
}

impl OptionsMenu {
    /// An empty, non-exclusive menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option at the end.
    pub fn with_option(mut self, option: MenuOption) -> Self {
        self.options.push(option);
        self
    }

    /// Add an option at the end.
    pub fn push(&mut self, option: MenuOption) {
        self.options.push(option);
    }

    /// Accept only meta commands as free text.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Mark this as a meta menu, always evaluated without narrative state.
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Replace the free-text rebuffs for this menu.
    pub fn with_rebuff(mut self, rebuff: impl Into<String>) -> Self {
        self.rebuff = Some(rebuff.into());
        self
    }

    /// Whether free-text gameplay commands are rejected.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Whether this is a meta menu.
    pub fn is_meta(&self) -> bool {
        self.meta
    }

    /// The custom rebuff, if any.
    pub fn rebuff(&self) -> Option<&str> {
        self.rebuff.as_deref()
    }

    /// All options in menu order.
    pub fn options(&self) -> &[MenuOption] {
        &self.options
    }

    /// Look up an option by id.
    pub fn option(&self, id: &str) -> Option<&MenuOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Times the option with this id has been chosen; 0 if unknown.
    pub fn picks(&self, id: &str) -> u32 {
        self.option(id).map_or(0, |o| o.picks)
    }

    /// Current state of one option.
    pub fn state_of(&self, option: &MenuOption, ctx: Option<&NarrativeContext>) -> OptionState {
        let prerequisite_unmet = option
            .prerequisite
            .as_deref()
            .is_some_and(|id| self.picks(id) == 0);

        if option.exhausted() || !option.visibility.holds(ctx) || prerequisite_unmet {
            OptionState::Hidden
        } else if option.is_greyed(ctx) {
            OptionState::Greyed
        } else {
            OptionState::Available
        }
    }

    /// Available options in menu order; the first is number 1.
    pub fn available(&self, ctx: Option<&NarrativeContext>) -> Vec<&MenuOption> {
        self.options
            .iter()
            .filter(|o| self.state_of(o, ctx) == OptionState::Available)
            .collect()
    }

    /// Number of available options.
    pub fn available_count(&self, ctx: Option<&NarrativeContext>) -> usize {
        self.available(ctx).len()
    }

    /// Number of options shown, greyed ones included.
    pub fn shown_count(&self, ctx: Option<&NarrativeContext>) -> usize {
        self.render(ctx).len()
    }

    /// Every shown option, numbered in menu order.
    pub fn render(&self, ctx: Option<&NarrativeContext>) -> Vec<RenderedOption> {
        let mut next = 0;
        self.options
            .iter()
            .filter_map(|option| {
                let number = match self.state_of(option, ctx) {
                    OptionState::Hidden => return None,
                    OptionState::Greyed => None,
                    OptionState::Available => {
                        next += 1;
                        Some(next)
                    }
                };
                Some(RenderedOption {
                    id: option.id.clone(),
                    number,
                    text: option.text(ctx),
                })
            })
            .collect()
    }

    /// Render every shown option as display lines.
    pub fn render_lines(&self, ctx: Option<&NarrativeContext>, config: &MenuConfig) -> Vec<String> {
        self.render(ctx)
            .into_iter()
            .map(|r| {
                let marker = r
                    .number
                    .map_or_else(|| config.greyed_marker.clone(), |n| n.to_string());
                config.format_option(&marker, &r.text)
            })
            .collect()
    }

    /// Choose the available option with this 1-based number.
    ///
    /// Returns its id and increments its pick count, or `None` without
    /// changing anything if the number is out of range.
    pub fn choose(&mut self, number: i64, ctx: Option<&NarrativeContext>) -> Option<String> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        let id = self.available(ctx).get(index)?.id.clone();
        let option = self.options.iter_mut().find(|o| o.id == id)?;
        option.picks += 1;
        debug!(option = %id, picks = option.picks, "option chosen");
        Some(id)
    }

    /// Forget every pick.
    pub fn reset_picks(&mut self) {
        for option in &mut self.options {
            option.picks = 0;
        }
    }
}
