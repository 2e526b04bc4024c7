//! The script runtime.
//!
//! A [`Runtime`] executes a validated [`Script`] from a [`Cursor`], reading
//! narrative state and presenting lines through a [`Presenter`]. It trusts
//! the validator: anything the validator would have rejected is reported as
//! a fatal [`RuntimeDefect`].

mod cursor;
mod gate;

use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, instrument, trace};
use vs_core::{BladeState, NarrativeContext, StoryFlag};
use vs_script::ast::{Directive, JumpTarget, LineContent, Modifier};
use vs_script::resolver::{DEFAULT_SUFFIX, label_persona};
use vs_script::{Script, ScriptLine};

pub use cursor::{Cursor, StartAt};
pub use gate::{GateKind, Gates};

use crate::config::RuntimeConfig;
use crate::error::{FictionError, FictionResult, RuntimeDefect};
use crate::io::{PresentedLine, Presenter};
use cursor::Seen;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The cursor ran past the last line.
    Finished,
    /// A `break` line fired; the cursor rests on the following line.
    Broke,
}

enum Step {
    Next,
    Jump(usize),
    Break,
}

/// Executes scripts.
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    rng: StdRng,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    /// Create a runtime seeded from the config.
    pub fn new(config: RuntimeConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run from `start` until the script ends or a `break` fires.
    #[instrument(skip_all, fields(script = cursor.script().name()))]
    pub fn run(
        &mut self,
        cursor: &mut Cursor<'_>,
        start: StartAt<'_>,
        ctx: &NarrativeContext,
        presenter: &mut dyn Presenter,
    ) -> FictionResult<RunOutcome> {
        let script = cursor.script();
        let position = match start {
            StartAt::Beginning => 0,
            StartAt::Resume => cursor.position(),
            StartAt::Label(label) => self.label(script, label)?,
            StartAt::SourceSuffixed(base) => script
                .labels()
                .resolve_suffixed(base, ctx.source.as_deref())
                .map(|(_, line)| line)
                .ok_or_else(|| {
                    defect(RuntimeDefect::UnknownLabel {
                        script: script.name().to_string(),
                        label: format!("{base}{DEFAULT_SUFFIX}"),
                    })
                })?,
        };
        cursor.set_position(position);
        debug!(?start, position, "run started");

        let mut steps = 0;
        while let Some(line) = script.line(cursor.position()) {
            steps += 1;
            if self.config.step_limit != 0 && steps > self.config.step_limit {
                return Err(defect(RuntimeDefect::StepLimit {
                    script: script.name().to_string(),
                    limit: self.config.step_limit,
                }));
            }

            match self.step(cursor, line, ctx, presenter)? {
                Step::Next => cursor.set_position(cursor.position() + 1),
                Step::Jump(target) => {
                    debug!(from = line.number(), to = target + 1, "jump");
                    cursor.set_position(target);
                }
                Step::Break => {
                    debug!(line = line.number(), "break");
                    cursor.set_position(cursor.position() + 1);
                    return Ok(RunOutcome::Broke);
                }
            }
        }
        Ok(RunOutcome::Finished)
    }

    fn step(
        &mut self,
        cursor: &mut Cursor<'_>,
        line: &ScriptLine,
        ctx: &NarrativeContext,
        presenter: &mut dyn Presenter,
    ) -> FictionResult<Step> {
        if let Some(gate) = Gates::from_line(line).blocked_by(ctx) {
            trace!(line = line.number(), ?gate, "line skipped");
            return Ok(Step::Next);
        }

        match &line.content {
            LineContent::Blank => Ok(Step::Next),
            LineContent::Dialogue { speaker, text, .. } => {
                let interrupt = line.has_interrupt();
                trace!(line = line.number(), speaker = %speaker, "present");
                presenter.present(&PresentedLine {
                    speaker: *speaker,
                    text,
                    line: line.number(),
                    interrupt,
                })?;
                if self.config.wait && !interrupt {
                    presenter.acknowledge()?;
                }
                Ok(Step::Next)
            }
            LineContent::Directive {
                keyword, parsed, ..
            } => match parsed {
                Ok(directive) => self.directive(cursor, line, directive, ctx, presenter),
                Err(_) => Err(defect(RuntimeDefect::MalformedDirective {
                    script: cursor.script().name().to_string(),
                    line: line.number(),
                    directive: keyword.name(),
                })),
            },
        }
    }

    fn directive(
        &mut self,
        cursor: &mut Cursor<'_>,
        line: &ScriptLine,
        directive: &Directive,
        ctx: &NarrativeContext,
        presenter: &mut dyn Presenter,
    ) -> FictionResult<Step> {
        let script = cursor.script();
        let no_branch = |directive: &'static str, state: String| {
            defect(RuntimeDefect::NoSwitchBranch {
                script: script.name().to_string(),
                line: line.number(),
                directive,
                state,
            })
        };

        match directive {
            Directive::Label(_) => Ok(Step::Next),
            Directive::Jumpto(JumpTarget::Label(label)) => self.label(script, label).map(Step::Jump),
            Directive::Jumpto(JumpTarget::Line(target)) => usize::try_from(*target)
                .ok()
                .filter(|n| (1..=script.len()).contains(n))
                .map(|n| Step::Jump(n - 1))
                .ok_or_else(|| {
                    defect(RuntimeDefect::LineOutOfRange {
                        script: script.name().to_string(),
                        line: line.number(),
                        target: *target,
                    })
                }),
            Directive::Break => {
                if line.modifiers.iter().any(Modifier::is_flag) {
                    Ok(Step::Break)
                } else {
                    Ok(Step::Next)
                }
            }
            Directive::Pause { min, max } => {
                let seconds = if min == max {
                    *min
                } else {
                    self.rng.random_range(*min..=*max)
                };
                let scaled = seconds as f64 * self.config.pause_scale.max(0.0);
                presenter.pause(Duration::try_from_secs_f64(scaled).unwrap_or_default())?;
                Ok(Step::Next)
            }
            Directive::FirstSwitch(target) => {
                if cursor.arrive(Seen::First(line.index)) {
                    self.label(script, target).map(Step::Jump)
                } else {
                    Ok(Step::Next)
                }
            }
            Directive::MoodSwitch(target) => {
                let harsh = ctx.has_flag(StoryFlag::Harsh);
                if cursor.arrive(Seen::Mood {
                    line: line.index,
                    harsh,
                }) {
                    self.label(script, target).map(Step::Jump)
                } else {
                    Ok(Step::Next)
                }
            }
            Directive::SourceSwitch(base) => {
                let (label, target) = script
                    .labels()
                    .resolve_suffixed(base, ctx.source.as_deref())
                    .ok_or_else(|| {
                        no_branch("sourceswitch", format!("source {:?}", ctx.source))
                    })?;
                debug!(%label, "sourceswitch");
                Ok(Step::Jump(target))
            }
            Directive::BladeSwitch {
                held,
                former,
                never,
            } => {
                let label = match ctx.blade {
                    BladeState::Held => held,
                    BladeState::Former => former,
                    BladeState::Never => never,
                };
                self.label(script, label).map(Step::Jump)
            }
            Directive::SwitchJump(labels) => {
                let chosen = labels
                    .iter()
                    .find(|l| label_persona(l).is_some_and(|p| ctx.voices.contains(p)))
                    .or_else(|| labels.iter().find(|l| label_persona(l).is_none()))
                    .ok_or_else(|| no_branch("switchjump", format!("voices {}", ctx.voices)))?;
                debug!(label = %chosen, "switchjump");
                self.label(script, chosen).map(Step::Jump)
            }
            Directive::NumSwitchJump(labels) => {
                let last = labels
                    .len()
                    .checked_sub(1)
                    .ok_or_else(|| no_branch("numswitchjump", "no labels".to_string()))?;
                let index = usize::try_from(ctx.number.max(0))
                    .unwrap_or(usize::MAX)
                    .min(last);
                debug!(number = ctx.number, index, "numswitchjump");
                self.label(script, &labels[index]).map(Step::Jump)
            }
            Directive::StringSwitchJump(pairs) => {
                let exact = ctx
                    .string
                    .as_deref()
                    .and_then(|s| pairs.iter().find(|(value, _)| value == s));
                let (_, label) = exact
                    .or_else(|| pairs.iter().find(|(value, _)| value == "*"))
                    .ok_or_else(|| {
                        no_branch("stringswitchjump", format!("string {:?}", ctx.string))
                    })?;
                debug!(%label, "stringswitchjump");
                self.label(script, label).map(Step::Jump)
            }
            Directive::NowPlaying(track) => {
                presenter.now_playing(track)?;
                Ok(Step::Next)
            }
        }
    }

    fn label(&self, script: &Script, label: &str) -> FictionResult<usize> {
        script.labels().get(label).ok_or_else(|| {
            defect(RuntimeDefect::UnknownLabel {
                script: script.name().to_string(),
                label: label.to_string(),
            })
        })
    }
}

fn defect(defect: RuntimeDefect) -> FictionError {
    error!(%defect, "fatal script defect");
    defect.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Transcript, TranscriptEvent};
    use vs_core::Persona;
    use vs_script::{ValidatorConfig, check_source};

    fn script(source: &str) -> Script {
        check_source("test", source, &ValidatorConfig::default())
            .into_script()
            .unwrap()
    }

    fn run_with(
        runtime: &mut Runtime,
        cursor: &mut Cursor<'_>,
        start: StartAt<'_>,
        ctx: &NarrativeContext,
    ) -> (FictionResult<RunOutcome>, Transcript) {
        let mut transcript = Transcript::new();
        let outcome = runtime.run(cursor, start, ctx, &mut transcript);
        (outcome, transcript)
    }

    fn spoken(source: &str, ctx: &NarrativeContext) -> Vec<String> {
        let script = script(source);
        let mut cursor = Cursor::new(&script);
        let (outcome, transcript) =
            run_with(&mut Runtime::default(), &mut cursor, StartAt::Beginning, ctx);
        assert_eq!(outcome.unwrap(), RunOutcome::Finished);
        transcript.spoken().into_iter().map(str::to_string).collect()
    }

    fn defect_of(source: &str, start: StartAt<'_>, ctx: &NarrativeContext) -> RuntimeDefect {
        let script = script(source);
        let mut cursor = Cursor::new(&script);
        match run_with(&mut Runtime::default(), &mut cursor, start, ctx).0 {
            Err(FictionError::Defect(defect)) => defect,
            other => panic!("expected a defect, got {other:?}"),
        }
    }

    #[test]
    fn presents_and_waits() {
        let script = script("You're on a path.\nCold: Does it matter? /// interrupt\nHero: Let's go.");
        let mut cursor = Cursor::new(&script);
        let ctx = NarrativeContext::new();
        let (outcome, transcript) =
            run_with(&mut Runtime::default(), &mut cursor, StartAt::Beginning, &ctx);
        assert_eq!(outcome.unwrap(), RunOutcome::Finished);
        assert!(cursor.is_finished());
        assert_eq!(transcript.spoken().len(), 3);
        assert_eq!(transcript.acknowledgements(), 2);
        assert_eq!(
            transcript.events()[0],
            TranscriptEvent::Line {
                speaker: vs_core::Speaker::default(),
                text: "You're on a path.".to_string(),
                line: 1,
            }
        );

        let mut runtime = Runtime::new(RuntimeConfig::default().with_wait(false));
        let mut cursor = Cursor::new(&script);
        let (_, transcript) = run_with(&mut runtime, &mut cursor, StartAt::Beginning, &ctx);
        assert_eq!(transcript.acknowledgements(), 0);
    }

    #[test]
    fn gates_skip_lines() {
        let source = "Armed. /// hasblade\nUnarmed. /// nothasblade\nCold: Quiet. /// checkvoice\nFrom the cabin. /// ifsource(cabin)";
        assert_eq!(spoken(source, &NarrativeContext::new()), vec!["Unarmed."]);

        let ctx = NarrativeContext::new()
            .with_blade(BladeState::Held)
            .with_voice(Persona::Cold)
            .with_source("cabin");
        assert_eq!(spoken(source, &ctx), vec!["Armed.", "Quiet.", "From the cabin."]);
    }

    #[test]
    fn gated_directive_is_skipped() {
        let source = "jumpto end /// harsh\nGentle.\nlabel end\nDone.";
        assert_eq!(spoken(source, &NarrativeContext::new()), vec!["Gentle.", "Done."]);
        let harsh = NarrativeContext::new().with_flag(StoryFlag::Harsh);
        assert_eq!(spoken(source, &harsh), vec!["Done."]);
    }

    #[test]
    fn jumps_by_label_and_line() {
        let ctx = NarrativeContext::new();
        assert_eq!(spoken("jumpto end\nSkipped.\nlabel end\nArrived.", &ctx), vec!["Arrived."]);
        assert_eq!(spoken("jumpto 4\nSkipped.\nSkipped.\nArrived.", &ctx), vec!["Arrived."]);
    }

    #[test]
    fn break_needs_a_holding_flag() {
        let source = "First.\nbreak /// threwblade\nSecond.";
        assert_eq!(spoken(source, &NarrativeContext::new()), vec!["First.", "Second."]);

        let script = script(source);
        let mut cursor = Cursor::new(&script);
        let mut runtime = Runtime::default();
        let ctx = NarrativeContext::new().with_flag(StoryFlag::ThrewBlade);
        let (outcome, transcript) = run_with(&mut runtime, &mut cursor, StartAt::Beginning, &ctx);
        assert_eq!(outcome.unwrap(), RunOutcome::Broke);
        assert_eq!(transcript.spoken(), vec!["First."]);
        assert_eq!(cursor.position(), 2);

        let (outcome, transcript) = run_with(&mut runtime, &mut cursor, StartAt::Resume, &ctx);
        assert_eq!(outcome.unwrap(), RunOutcome::Finished);
        assert_eq!(transcript.spoken(), vec!["Second."]);
    }

    const FIRST_SWITCH: &str = "label start\nfirstswitch seen_start\nFirst visit.\njumpto done\nlabel seen_start\nWelcome back.\nlabel done";

    #[test]
    fn firstswitch_per_cursor() {
        let script = script(FIRST_SWITCH);
        let ctx = NarrativeContext::new();
        let mut runtime = Runtime::default();
        let mut main = Cursor::new(&script);
        let mut secondary = Cursor::new(&script);

        let (_, first) = run_with(&mut runtime, &mut main, StartAt::Beginning, &ctx);
        assert_eq!(first.spoken(), vec!["First visit."]);
        let (_, again) = run_with(&mut runtime, &mut main, StartAt::Label("start"), &ctx);
        assert_eq!(again.spoken(), vec!["Welcome back."]);

        let (_, other) = run_with(&mut runtime, &mut secondary, StartAt::Beginning, &ctx);
        assert_eq!(other.spoken(), vec!["First visit."]);

        main.forget_seen();
        let (_, reset) = run_with(&mut runtime, &mut main, StartAt::Beginning, &ctx);
        assert_eq!(reset.spoken(), vec!["First visit."]);
    }

    #[test]
    fn moodswitch_tracks_each_mood() {
        let script = script(&FIRST_SWITCH.replace("firstswitch", "moodswitch"));
        let gentle = NarrativeContext::new();
        let harsh = NarrativeContext::new().with_flag(StoryFlag::Harsh);
        let mut runtime = Runtime::default();
        let mut cursor = Cursor::new(&script);

        let mut visit = |ctx: &NarrativeContext| {
            run_with(&mut runtime, &mut cursor, StartAt::Beginning, ctx)
                .1
                .spoken()
                .concat()
        };
        assert_eq!(visit(&gentle), "First visit.");
        assert_eq!(visit(&gentle), "Welcome back.");
        assert_eq!(visit(&harsh), "First visit.");
        assert_eq!(visit(&harsh), "Welcome back.");
    }

    const SOURCE_SWITCH: &str = "sourceswitch from_\nlabel from_cabin\nCabin.\njumpto end\nlabel from_default\nDefault.\nlabel end";

    #[test]
    fn sourceswitch_with_fallback() {
        let cabin = NarrativeContext::new().with_source("cabin");
        let woods = NarrativeContext::new().with_source("woods");
        assert_eq!(spoken(SOURCE_SWITCH, &cabin), vec!["Cabin."]);
        assert_eq!(spoken(SOURCE_SWITCH, &woods), vec!["Default."]);
        assert_eq!(spoken(SOURCE_SWITCH, &NarrativeContext::new()), vec!["Default."]);
    }

    #[test]
    fn sourceswitch_without_branch_is_fatal() {
        let source = "sourceswitch from_\nlabel from_cabin\nCabin.";
        let woods = NarrativeContext::new().with_source("woods");
        assert!(matches!(
            defect_of(source, StartAt::Beginning, &woods),
            RuntimeDefect::NoSwitchBranch {
                directive: "sourceswitch",
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn start_at_source_suffixed_label() {
        let script = script(SOURCE_SWITCH);
        let mut cursor = Cursor::new(&script);
        let ctx = NarrativeContext::new().with_source("cabin");
        let (_, transcript) = run_with(
            &mut Runtime::default(),
            &mut cursor,
            StartAt::SourceSuffixed("from_"),
            &ctx,
        );
        assert_eq!(transcript.spoken(), vec!["Cabin."]);
    }

    #[test]
    fn bladeswitch_by_possession() {
        let source = "bladeswitch held former never\nlabel held\nHeld.\njumpto end\nlabel former\nFormer.\njumpto end\nlabel never\nNever.\nlabel end";
        for (blade, expected) in [
            (BladeState::Held, "Held."),
            (BladeState::Former, "Former."),
            (BladeState::Never, "Never."),
        ] {
            let ctx = NarrativeContext::new().with_blade(blade);
            assert_eq!(spoken(source, &ctx), vec![expected]);
        }
    }

    #[test]
    fn switchjump_prefers_active_personas_in_order() {
        let source = "switchjump cold_path hero_path fallback\nlabel cold_path\nCold.\njumpto end\nlabel hero_path\nHero.\njumpto end\nlabel fallback\nNobody.\nlabel end";
        let hero = NarrativeContext::new().with_voice(Persona::Hero);
        let both = hero.clone().with_voice(Persona::Cold);
        assert_eq!(spoken(source, &hero), vec!["Hero."]);
        assert_eq!(spoken(source, &both), vec!["Cold."]);
        assert_eq!(spoken(source, &NarrativeContext::new()), vec!["Nobody."]);
    }

    #[test]
    fn switchjump_without_fallback_is_fatal() {
        let source = "switchjump cold_path\nlabel cold_path\nCold.";
        assert!(matches!(
            defect_of(source, StartAt::Beginning, &NarrativeContext::new()),
            RuntimeDefect::NoSwitchBranch {
                directive: "switchjump",
                ..
            }
        ));
    }

    #[test]
    fn numswitchjump_clamps() {
        let source = "numswitchjump zero one\nlabel zero\nZero.\njumpto end\nlabel one\nOne.\nlabel end";
        for (number, expected) in [(-3, "Zero."), (0, "Zero."), (1, "One."), (99, "One.")] {
            let ctx = NarrativeContext::new().with_number(number);
            assert_eq!(spoken(source, &ctx), vec![expected]);
        }
    }

    #[test]
    fn stringswitchjump_exact_then_wildcard() {
        let source = "stringswitchjump * other mound to_mound\nlabel to_mound\nMound.\njumpto end\nlabel other\nOther.\nlabel end";
        let mound = NarrativeContext::new().with_string("mound");
        let elsewhere = NarrativeContext::new().with_string("elsewhere");
        assert_eq!(spoken(source, &mound), vec!["Mound."]);
        assert_eq!(spoken(source, &elsewhere), vec!["Other."]);
        assert_eq!(spoken(source, &NarrativeContext::new()), vec!["Other."]);

        let strict = "stringswitchjump mound to_mound\nlabel to_mound\nMound.";
        assert!(matches!(
            defect_of(strict, StartAt::Beginning, &elsewhere),
            RuntimeDefect::NoSwitchBranch {
                directive: "stringswitchjump",
                ..
            }
        ));
    }

    #[test]
    fn pauses_are_seeded_and_scaled() {
        let script = script("pause 2\npause 1 3");
        let ctx = NarrativeContext::new();
        let pauses = |config: RuntimeConfig| {
            let mut cursor = Cursor::new(&script);
            let (_, transcript) =
                run_with(&mut Runtime::new(config), &mut cursor, StartAt::Beginning, &ctx);
            transcript
                .events()
                .iter()
                .filter_map(|e| match e {
                    TranscriptEvent::Pause(d) => Some(*d),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let first = pauses(RuntimeConfig::default());
        assert_eq!(first.len(), 2);
        assert_eq!(first[0], Duration::from_secs(2));
        assert!((1..=3).contains(&first[1].as_secs()));
        assert_eq!(first, pauses(RuntimeConfig::default()));

        let halved = pauses(RuntimeConfig::default().with_pause_scale(0.5));
        assert_eq!(halved[0], Duration::from_secs(1));
    }

    #[test]
    fn nowplaying_reaches_presenter() {
        let script = script("nowplaying The Princess\nHello.");
        let mut cursor = Cursor::new(&script);
        let (_, transcript) = run_with(
            &mut Runtime::default(),
            &mut cursor,
            StartAt::Beginning,
            &NarrativeContext::new(),
        );
        assert_eq!(
            transcript.events()[0],
            TranscriptEvent::NowPlaying("The Princess".to_string())
        );
    }

    #[test]
    fn unknown_start_label() {
        assert_eq!(
            defect_of("Hello.", StartAt::Label("nowhere"), &NarrativeContext::new()),
            RuntimeDefect::UnknownLabel {
                script: "test".to_string(),
                label: "nowhere".to_string(),
            }
        );
    }

    #[test]
    fn endless_loop_hits_step_limit() {
        let script = script("label spin\njumpto spin");
        let mut cursor = Cursor::new(&script);
        let mut runtime = Runtime::new(RuntimeConfig::default().with_step_limit(10));
        let (outcome, _) = run_with(&mut runtime, &mut cursor, StartAt::Beginning, &NarrativeContext::new());
        assert!(matches!(
            outcome,
            Err(FictionError::Defect(RuntimeDefect::StepLimit { limit: 10, .. }))
        ));
    }
}
