//! Static validation of a parsed script.
//!
//! The validator never executes anything and never fails: each defect becomes
//! one [`Diagnostic`] in the returned [`Report`].

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, instrument};
use vs_core::{Persona, Speaker, StoryFlag};

use crate::ast::{
    ContextKind, ContextValue, Directive, DirectiveIssue, DirectiveKeyword, JumpTarget,
    LineContent, Modifier, ModifierBlock, ModifierIssue, ScriptLine,
};
use crate::config::ValidatorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Report};
use crate::parser::ScriptDocument;

/// Validate a parsed script.
#[instrument(skip_all, fields(script = %document.name))]
pub fn validate(document: &ScriptDocument, config: &ValidatorConfig) -> Report {
    let mut validator = Validator::new(document);
    validator.validate();

    let diagnostics: Vec<Diagnostic> = validator
        .diagnostics
        .into_iter()
        .map(|mut d| {
            d.severity = config.severity_of(d.code);
            d
        })
        .collect();

    let report = Report::new(diagnostics);
    debug!(
        errors = report.errors().count(),
        notes = report.notes().count(),
        "validated script"
    );
    report
}

struct Validator<'a> {
    document: &'a ScriptDocument,
    diagnostics: Vec<Diagnostic>,
    referenced: HashSet<&'a str>,
}

impl<'a> Validator<'a> {
    fn new(document: &'a ScriptDocument) -> Self {
        Self {
            document,
            diagnostics: Vec::new(),
            referenced: HashSet::new(),
        }
    }

    fn validate(&mut self) {
        let document = self.document;

        // Pass 1: each line on its own, recording label references
        for line in &document.lines {
            self.check_line(line);
        }

        // Pass 2: label table, now that every reference is known
        self.check_labels();
    }

    fn push(&mut self, line: &ScriptLine, code: DiagnosticCode) -> &mut Diagnostic {
        self.diagnostics
            .push(Diagnostic::new(line.index, line.span.clone(), code));
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    fn report<I, S>(&mut self, line: &ScriptLine, code: DiagnosticCode, details: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let diag = self.push(line, code);
        diag.details.extend(details.into_iter().map(Into::into));
    }

    fn check_line(&mut self, line: &'a ScriptLine) {
        if let LineContent::Dialogue {
            unknown_speaker: Some(name),
            ..
        } = &line.content
        {
            self.report(line, DiagnosticCode::UnknownSpeaker, [name.as_str()]);
        }

        if let LineContent::Directive {
            keyword, parsed, ..
        } = &line.content
        {
            match parsed {
                Ok(directive) => self.check_directive(line, directive),
                Err(issue) => {
                    let (code, details) = directive_issue(*keyword, issue);
                    self.report(line, code, details);
                }
            }
        }

        self.check_block(line);
    }

    // -- directives -----------------------------------------------------------

    fn check_directive(&mut self, line: &'a ScriptLine, directive: &'a Directive) {
        let document = self.document;
        let labels = &document.labels;

        match directive {
            Directive::Jumpto(JumpTarget::Line(n)) => {
                let in_range = usize::try_from(*n)
                    .is_ok_and(|n| n >= 1 && n <= document.len());
                if !in_range {
                    self.report(line, DiagnosticCode::JumptoIndexOutOfRange, [n.to_string()]);
                }
            }
            Directive::Jumpto(JumpTarget::Label(label)) => {
                self.referenced.insert(label);
                if !labels.contains(label) {
                    self.report(line, DiagnosticCode::JumptoUnknownLabel, [label.as_str()]);
                }
            }
            Directive::Break => {
                if !line.modifiers.iter().any(Modifier::is_flag) {
                    self.push(line, DiagnosticCode::BreakWithoutFlag);
                }
            }
            Directive::SourceSwitch(base) => {
                let mut matched = false;
                for entry in labels.with_prefix(base) {
                    self.referenced.insert(&entry.name);
                    matched = true;
                }
                if !matched {
                    self.report(line, DiagnosticCode::AutoswitchNoSuffixedLabel, [base.as_str()]);
                }
            }
            Directive::FirstSwitch(_)
            | Directive::MoodSwitch(_)
            | Directive::BladeSwitch { .. } => {
                self.check_references(line, directive, DiagnosticCode::AutoswitchUnknownLabel);
            }
            Directive::SwitchJump(_)
            | Directive::NumSwitchJump(_)
            | Directive::StringSwitchJump(_) => {
                self.check_references(line, directive, DiagnosticCode::SwitchjumpUnknownLabel);
            }
            Directive::Label(_) | Directive::Pause { .. } | Directive::NowPlaying(_) => {}
        }
    }

    /// One diagnostic listing every undefined label the directive names.
    fn check_references(
        &mut self,
        line: &'a ScriptLine,
        directive: &'a Directive,
        code: DiagnosticCode,
    ) {
        let labels = &self.document.labels;
        let mut missing = Vec::new();
        for label in directive.label_references() {
            if !labels.contains(label) && !missing.contains(&label) {
                missing.push(label);
            }
        }
        self.referenced.extend(directive.label_references());
        if !missing.is_empty() {
            self.report(line, code, missing);
        }
    }

    // -- modifier block -------------------------------------------------------

    fn check_block(&mut self, line: &'a ScriptLine) {
        match &line.block {
            ModifierBlock::Absent => return,
            ModifierBlock::Empty => {
                self.push(line, DiagnosticCode::EmptyModifierList);
                return;
            }
            ModifierBlock::MultipleDividers(count) => {
                self.report(line, DiagnosticCode::MultipleDividers, [count.to_string()]);
                return;
            }
            ModifierBlock::Entries(_) => {}
        }

        let ignored = match &line.content {
            LineContent::Blank => true,
            LineContent::Directive { keyword, .. } => *keyword == DirectiveKeyword::Label,
            LineContent::Dialogue { .. } => false,
        };
        if ignored {
            let names = line.block.entries().iter().map(|m| m.name.as_str());
            self.report(line, DiagnosticCode::ModifiersIgnored, names);
            return;
        }

        for raw in line.block.entries() {
            if let Err(issue) = Modifier::from_raw(raw) {
                let (code, details) = modifier_issue(issue);
                self.report(line, code, details);
            }
        }

        self.check_modifiers(line);
    }

    fn check_modifiers(&mut self, line: &'a ScriptLine) {
        let mut unique: Vec<&Modifier> = Vec::with_capacity(line.modifiers.len());
        for modifier in &line.modifiers {
            if unique.contains(&modifier) {
                self.report(line, DiagnosticCode::RedundantModifier, [modifier.name()]);
            } else {
                unique.push(modifier);
            }
        }

        if line.has_interrupt() && !line.is_dialogue() {
            self.push(line, DiagnosticCode::InterruptOnNonDialogue);
        }

        let speaker_persona = line.speaker().and_then(Speaker::persona);
        let bare_checkvoice = unique
            .iter()
            .any(|m| matches!(m, Modifier::CheckVoice(list) if list.is_empty()));
        if bare_checkvoice && speaker_persona.is_none() {
            let speaker = line
                .speaker()
                .map_or_else(|| "no speaker".to_string(), |s| s.name().to_string());
            self.report(line, DiagnosticCode::CheckVoiceWithoutPersona, [speaker]);
        }

        self.check_flag_conflicts(line, &unique);
        self.check_context_conflicts(line, &unique);
        self.check_voice_conflicts(line, &unique, speaker_persona);
    }

    fn check_flag_conflicts(&mut self, line: &'a ScriptLine, modifiers: &[&Modifier]) {
        let mut positive = BTreeSet::new();
        let mut negative = BTreeSet::new();
        for m in modifiers {
            if let Modifier::Flag { flag, negated } = m {
                if *negated {
                    negative.insert(*flag);
                } else {
                    positive.insert(*flag);
                }
            }
        }

        for flag in positive.intersection(&negative) {
            self.report(line, DiagnosticCode::FlagAndNegation, [flag.name()]);
        }

        let Some(keyword) = line.keyword() else {
            return;
        };
        let decided: &[StoryFlag] = match keyword {
            DirectiveKeyword::FirstSwitch => &[StoryFlag::FirstVessel],
            DirectiveKeyword::MoodSwitch => &[StoryFlag::Harsh],
            DirectiveKeyword::BladeSwitch => &[StoryFlag::HasBlade, StoryFlag::ThrewBlade],
            _ => &[],
        };
        for m in modifiers {
            if let Modifier::Flag { flag, .. } = m
                && decided.contains(flag)
            {
                self.report(
                    line,
                    DiagnosticCode::FlagDuplicatesSwitch,
                    [m.name(), keyword.name().to_string()],
                );
            }
        }
    }

    fn check_context_conflicts(&mut self, line: &'a ScriptLine, modifiers: &[&Modifier]) {
        for kind in [ContextKind::Source, ContextKind::String, ContextKind::Number] {
            let mut positive: Vec<&ContextValue> = Vec::new();
            let mut negative: Vec<&ContextValue> = Vec::new();
            for m in modifiers {
                if let Modifier::Context {
                    kind: k,
                    value,
                    negated,
                } = m
                    && *k == kind
                {
                    if *negated {
                        negative.push(value);
                    } else {
                        positive.push(value);
                    }
                }
            }

            for value in &positive {
                if negative.contains(value) {
                    self.report(
                        line,
                        DiagnosticCode::SameValueCheckedAndNegated,
                        [kind.modifier_name().to_string(), value.to_string()],
                    );
                }
            }

            if positive.len() > 1 {
                self.report(
                    line,
                    DiagnosticCode::AmbiguousContextChecks,
                    positive.iter().map(|v| v.to_string()),
                );
            }
        }

        let Some(keyword) = line.keyword() else {
            return;
        };
        for m in modifiers {
            let duplicates = match (keyword, m) {
                (DirectiveKeyword::SourceSwitch, Modifier::Context { kind, .. }) => {
                    *kind == ContextKind::Source
                }
                (DirectiveKeyword::NumSwitchJump, Modifier::Context { kind, .. }) => {
                    *kind == ContextKind::Number
                }
                (DirectiveKeyword::StringSwitchJump, Modifier::Context { kind, .. }) => {
                    *kind == ContextKind::String
                }
                (
                    DirectiveKeyword::SwitchJump,
                    Modifier::CheckVoice(_) | Modifier::CheckNoVoice(_),
                ) => true,
                _ => false,
            };
            if duplicates {
                self.report(
                    line,
                    DiagnosticCode::CheckDuplicatesSwitch,
                    [m.name(), keyword.name().to_string()],
                );
            }
        }
    }

    fn check_voice_conflicts(
        &mut self,
        line: &'a ScriptLine,
        modifiers: &[&Modifier],
        speaker: Option<Persona>,
    ) {
        let mut required = BTreeSet::new();
        let mut excluded = BTreeSet::new();
        for m in modifiers {
            match m {
                Modifier::CheckVoice(list) if list.is_empty() => required.extend(speaker),
                Modifier::CheckVoice(list) => required.extend(list.iter().copied()),
                Modifier::CheckNoVoice(list) => excluded.extend(list.iter().copied()),
                _ => {}
            }
        }

        let shared: Vec<&str> = required
            .intersection(&excluded)
            .map(|p: &Persona| p.name())
            .collect();
        if !shared.is_empty() {
            self.report(line, DiagnosticCode::VoiceRequiredAndExcluded, shared);
        }

        if let Some(persona) = speaker
            && excluded.contains(&persona)
        {
            self.report(line, DiagnosticCode::SpeakerExcluded, [persona.name()]);
        }
    }

    // -- labels ---------------------------------------------------------------

    fn check_labels(&mut self) {
        let document = self.document;

        for dup in document.labels.duplicates() {
            if let Some(line) = document.line(dup.line) {
                self.report(line, DiagnosticCode::LabelDuplicate, [dup.name.as_str()]);
            }
        }

        for entry in document.labels.iter() {
            if self.referenced.contains(entry.name.as_str()) {
                continue;
            }
            if let Some(line) = document.line(entry.line) {
                self.report(line, DiagnosticCode::LabelUnreferenced, [entry.name.as_str()]);
            }
        }
    }
}

fn directive_issue(keyword: DirectiveKeyword, issue: &DirectiveIssue) -> (DiagnosticCode, Vec<String>) {
    use DiagnosticCode as C;
    match issue {
        DirectiveIssue::MissingArgument => {
            let code = match keyword {
                DirectiveKeyword::Label => C::LabelMissingName,
                DirectiveKeyword::Jumpto => C::JumptoMissingTarget,
                DirectiveKeyword::Pause => C::PauseMissingArgument,
                _ => C::NowplayingMissingArgument,
            };
            (code, Vec::new())
        }
        DirectiveIssue::TooManyArguments(n) => {
            let code = match keyword {
                DirectiveKeyword::Label => C::LabelTooManyArguments,
                DirectiveKeyword::Jumpto => C::JumptoTooManyArguments,
                _ => C::PauseTooManyArguments,
            };
            (code, vec![n.to_string()])
        }
        DirectiveIssue::UnexpectedArgument(args) => (C::BreakWithArgument, args.clone()),
        DirectiveIssue::NotInteger(v) => (C::PauseNotInteger, vec![v.clone()]),
        DirectiveIssue::Negative(v) => (C::PauseNegative, vec![v.clone()]),
        DirectiveIssue::InvertedRange(a, b) => {
            (C::PauseInvertedRange, vec![a.to_string(), b.to_string()])
        }
        DirectiveIssue::MissingPrefix(v) => (C::AutoswitchMissingPrefix, vec![v.clone()]),
        DirectiveIssue::MissingSuffix(v) => (C::AutoswitchMissingSuffix, vec![v.clone()]),
        DirectiveIssue::WrongArity(n) => (
            C::AutoswitchWrongArity,
            vec![keyword.name().to_string(), n.to_string()],
        ),
        DirectiveIssue::NoLabels => (C::SwitchjumpNoLabels, vec![keyword.name().to_string()]),
        DirectiveIssue::UnpairedArguments(n) => (C::SwitchjumpUnpairedArguments, vec![n.to_string()]),
    }
}

fn modifier_issue(issue: ModifierIssue) -> (DiagnosticCode, Vec<String>) {
    use DiagnosticCode as C;
    match issue {
        ModifierIssue::Unknown(name) => (C::UnknownModifier, vec![name]),
        ModifierIssue::Malformed(text) => (C::MalformedArguments, vec![text]),
        ModifierIssue::FlagArgument(name) => (C::FlagWithArgument, vec![name]),
        ModifierIssue::InterruptArgument => (C::InterruptWithArgument, Vec::new()),
        ModifierIssue::ContextArity { name, count } => {
            (C::ContextArity, vec![name, count.to_string()])
        }
        ModifierIssue::NotInteger(value) => (C::IfNumNotInteger, vec![value]),
        ModifierIssue::MissingVoiceArgument => (C::CheckNoVoiceMissingArgument, Vec::new()),
        ModifierIssue::UnknownPersonas(names) => (C::UnknownPersona, names),
    }
}
