//! Per-line gates built from modifiers.

use vs_core::{Condition, NarrativeContext};
use vs_script::ScriptLine;
use vs_script::ast::{ContextKind, ContextValue, Modifier};

/// Which gate stopped a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// A story flag gate.
    Flag,
    /// A `checkvoice`/`checknovoice` gate.
    Persona,
    /// An `ifsource`/`ifstring`/`ifnum` gate.
    Context,
}

/// The conditions a line must meet, grouped in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gates {
    flags: Vec<Condition>,
    personas: Vec<Condition>,
    context: Vec<Condition>,
}

impl Gates {
    /// Collect the gates of one line.
    pub fn from_line(line: &ScriptLine) -> Self {
        let mut gates = Self::default();
        let speaker = line.speaker().and_then(|s| s.persona());

        for modifier in &line.modifiers {
            match modifier {
                Modifier::Flag { flag, negated } => {
                    gates.flags.push(negate(Condition::Flag(*flag), *negated));
                }
                Modifier::CheckVoice(personas) if personas.is_empty() => {
                    if let Some(persona) = speaker {
                        gates.personas.push(Condition::VoiceActive(persona));
                    }
                }
                Modifier::CheckVoice(personas) => gates.personas.extend(
                    personas.iter().map(|p| Condition::VoiceActive(*p)),
                ),
                Modifier::CheckNoVoice(personas) => gates.personas.extend(
                    personas
                        .iter()
                        .map(|p| Condition::not(Condition::VoiceActive(*p))),
                ),
                Modifier::Context {
                    kind,
                    value,
                    negated,
                } => {
                    let condition = match (kind, value) {
                        (_, ContextValue::Number(n)) => Condition::NumberEquals(*n),
                        (ContextKind::Source, value) => Condition::SourceIs(value.to_string()),
                        (_, value) => Condition::StringIs(value.to_string()),
                    };
                    gates.context.push(negate(condition, *negated));
                }
                Modifier::Interrupt => {}
            }
        }
        gates
    }

    /// Whether the line has no gates.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.personas.is_empty() && self.context.is_empty()
    }

    /// The first gate group that fails, checking flags, then personas,
    /// then context.
    pub fn blocked_by(&self, ctx: &NarrativeContext) -> Option<GateKind> {
        [
            (GateKind::Flag, &self.flags),
            (GateKind::Persona, &self.personas),
            (GateKind::Context, &self.context),
        ]
        .into_iter()
        .find(|(_, conditions)| !conditions.iter().all(|c| c.evaluate(ctx)))
        .map(|(kind, _)| kind)
    }
}

fn negate(condition: Condition, negated: bool) -> Condition {
    if negated {
        Condition::not(condition)
    } else {
        condition
    }
}
