//! Condition evaluation for option visibility and scene logic.

use crate::context::{BladeState, NarrativeContext, StoryFlag};
use crate::persona::Persona;

/// A condition that can be evaluated against the narrative context.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Condition {
    /// Check if a persona is active.
    VoiceActive(Persona),
    /// Check if a story flag holds.
    Flag(StoryFlag),
    /// Check blade possession.
    Blade(BladeState),
    /// Check the source context.
    SourceIs(String),
    /// Check the string context.
    StringIs(String),
    /// Check the numeric counter for equality.
    NumberEquals(i64),
    /// Check the numeric counter against a lower bound.
    NumberAtLeast(i64),
    /// Check if a chapter has been visited.
    Visited(String),
    /// Check if a narrator-type speaker is present.
    NarratorPresent,
    /// Logical NOT.
    Not(Box<Condition>),
    /// Logical AND.
    And(Vec<Condition>),
    /// Logical OR.
    Or(Vec<Condition>),
    /// Always true.
    #[default]
    Always,
}

impl Condition {
    /// Negate a condition.
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Evaluate the condition against the current state.
    pub fn evaluate(&self, ctx: &NarrativeContext) -> bool {
        match self {
            Condition::VoiceActive(persona) => ctx.voices.contains(*persona),
            Condition::Flag(flag) => ctx.has_flag(*flag),
            Condition::Blade(state) => ctx.blade == *state,
            Condition::SourceIs(source) => ctx.source.as_deref() == Some(source.as_str()),
            Condition::StringIs(value) => ctx.string.as_deref() == Some(value.as_str()),
            Condition::NumberEquals(n) => ctx.number == *n,
            Condition::NumberAtLeast(n) => ctx.number >= *n,
            Condition::Visited(chapter) => ctx.has_visited(chapter),
            Condition::NarratorPresent => ctx.has_narrator(),
            Condition::Not(inner) => !inner.evaluate(ctx),
            Condition::And(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            Condition::Or(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
            Condition::Always => true,
        }
    }

    /// Evaluate without any narrative state.
    ///
    /// A condition that reads any state is false; only compositions of
    /// `Always` can hold.
    pub fn evaluate_stateless(&self) -> bool {
        !self.reads_state() && self.evaluate(&NarrativeContext::default())
    }

    /// Whether any leaf of this condition reads narrative state.
    pub fn reads_state(&self) -> bool {
        match self {
            Condition::Always => false,
            Condition::Not(inner) => inner.reads_state(),
            Condition::And(conditions) | Condition::Or(conditions) => {
                conditions.iter().any(Condition::reads_state)
            }
            _ => true,
        }
    }
}
