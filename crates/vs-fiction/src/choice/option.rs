//! A single selectable option.

use vs_core::{Condition, NarrativeContext};

/// Whether an option may be shown at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Visibility {
    /// Always visible.
    #[default]
    Always,
    /// Fixed by the caller when the menu is built.
    Bool(bool),
    /// Evaluated against narrative state on every render.
    Condition(Condition),
}

impl Visibility {
    /// Evaluate visibility; without state only stateless conditions hold.
    pub fn holds(&self, ctx: Option<&NarrativeContext>) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::Bool(visible) => *visible,
            Visibility::Condition(condition) => match ctx {
                Some(ctx) => condition.evaluate(ctx),
                None => condition.evaluate_stateless(),
            },
        }
    }
}

/// How an option appears in the current render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    /// Not shown.
    Hidden,
    /// Shown with a placeholder and never selectable.
    Greyed,
    /// Shown with a number and selectable.
    Available,
}

/// One selectable action in a menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuOption {
    /// Identifier returned when the option is chosen.
    pub id: String,
    /// Display text; may reference `{source}`, `{string}`, `{number}`.
    pub template: String,
    /// Visibility rule.
    pub visibility: Visibility,
    /// Id of an option that must have been chosen first.
    pub prerequisite: Option<String>,
    /// Picks after which the option hides; 0 means unlimited.
    pub max_picks: u32,
    /// Times the option has been chosen.
    pub picks: u32,
    /// Explicitly greyed out.
    pub greyed: bool,
    /// Greyed once this chapter has been visited.
    pub tied_chapter: Option<String>,
}

impl MenuOption {
    /// Create an always-visible option with no pick ceiling.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
            visibility: Visibility::Always,
            prerequisite: None,
            max_picks: 0,
            picks: 0,
            greyed: false,
            tied_chapter: None,
        }
    }

    /// Show the option only while `condition` holds.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.visibility = Visibility::Condition(condition);
        self
    }

    /// Show the option only if `visible`.
    pub fn visible_if(mut self, visible: bool) -> Self {
        self.visibility = Visibility::Bool(visible);
        self
    }

    /// Require another option to have been chosen first.
    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        self.prerequisite = Some(id.into());
        self
    }

    /// Hide the option after it has been chosen `max` times.
    pub fn with_max_picks(mut self, max: u32) -> Self {
        self.max_picks = max;
        self
    }

    /// Hide the option after its first pick.
    pub fn once(self) -> Self {
        self.with_max_picks(1)
    }

    /// Grey the option out.
    pub fn greyed(mut self, greyed: bool) -> Self {
        self.greyed = greyed;
        self
    }

    /// Grey the option out once `chapter` has been visited.
    pub fn tied_to(mut self, chapter: impl Into<String>) -> Self {
        self.tied_chapter = Some(chapter.into());
        self
    }

    /// Whether the pick ceiling has been reached.
    pub fn exhausted(&self) -> bool {
        self.max_picks != 0 && self.picks >= self.max_picks
    }

    /// Whether the option is greyed, explicitly or by a visited chapter.
    pub fn is_greyed(&self, ctx: Option<&NarrativeContext>) -> bool {
        self.greyed
            || self
                .tied_chapter
                .as_deref()
                .is_some_and(|chapter| ctx.is_some_and(|ctx| ctx.has_visited(chapter)))
    }

    /// Display text with context placeholders filled in.
    ///
    /// Without state, placeholders expand to empty text and `0`.
    pub fn text(&self, ctx: Option<&NarrativeContext>) -> String {
        let (source, string, number) = match ctx {
            Some(ctx) => (
                ctx.source.as_deref().unwrap_or_default(),
                ctx.string.as_deref().unwrap_or_default(),
                ctx.number,
            ),
            None => ("", "", 0),
        };
        self.template
            .replace("{source}", source)
            .replace("{string}", string)
            .replace("{number}", &number.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vs_core::{Persona, StoryFlag};

    #[test]
    fn visibility_rules() {
        let ctx = NarrativeContext::new().with_voice(Persona::Cold);
        assert!(Visibility::Always.holds(None));
        assert!(!Visibility::Bool(false).holds(Some(&ctx)));
        let cold = Visibility::Condition(Condition::VoiceActive(Persona::Cold));
        assert!(cold.holds(Some(&ctx)));
        assert!(!cold.holds(None));
    }

    #[test]
    fn stateless_negation_does_not_hold() {
        let visibility = Visibility::Condition(Condition::not(Condition::Flag(StoryFlag::Harsh)));
        assert!(visibility.holds(Some(&NarrativeContext::new())));
        assert!(!visibility.holds(None));
    }

    #[test]
    fn ceiling() {
        let mut option = MenuOption::new("a", "A").with_max_picks(2);
        assert!(!option.exhausted());
        option.picks = 2;
        assert!(option.exhausted());

        let mut unlimited = MenuOption::new("b", "B");
        unlimited.picks = 1000;
        assert!(!unlimited.exhausted());
    }

    #[test]
    fn tied_chapter_greys() {
        let option = MenuOption::new("a", "A").tied_to("the-den");
        let mut ctx = NarrativeContext::new();
        assert!(!option.is_greyed(Some(&ctx)));
        ctx.visit_chapter("the-den");
        assert!(option.is_greyed(Some(&ctx)));
        assert!(!option.is_greyed(None));
    }

    #[test]
    fn template_substitution() {
        let option = MenuOption::new("a", "Return to {source} ({number}), {string}.");
        let ctx = NarrativeContext::new()
            .with_source("the cabin")
            .with_string("again")
            .with_number(3);
        assert_eq!(option.text(Some(&ctx)), "Return to the cabin (3), again.");
        assert_eq!(option.text(None), "Return to  (0), .");
    }
}
