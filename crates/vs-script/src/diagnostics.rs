//! Diagnostics produced by the validator.

use std::fmt;

use ariadne::{Color, Label, Report as AriadneReport, ReportKind, Source};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::ast::Span;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A defect that makes the script unfit to run.
    Error,
    /// Advisory only.
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Note => "note",
        })
    }
}

/// The diagnostic type, the first half of the `(type, subtype)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticType {
    /// `invalid pause`.
    Pause,
    /// `invalid break`.
    Break,
    /// `invalid jumpto`.
    Jumpto,
    /// `invalid autoswitch`.
    Autoswitch,
    /// `invalid switchjump`.
    Switchjump,
    /// `invalid nowplaying`.
    Nowplaying,
    /// `invalid label`.
    Label,
    /// `invalid modifier`.
    Modifier,
    /// `invalid interrupt`.
    Interrupt,
    /// `invalid checkvoice`.
    Checkvoice,
    /// `conflicting modifiers`.
    Conflict,
    /// `unknown speaker`.
    UnknownSpeaker,
}

impl DiagnosticType {
    /// The display name of this type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pause => "invalid pause",
            Self::Break => "invalid break",
            Self::Jumpto => "invalid jumpto",
            Self::Autoswitch => "invalid autoswitch",
            Self::Switchjump => "invalid switchjump",
            Self::Nowplaying => "invalid nowplaying",
            Self::Label => "invalid label",
            Self::Modifier => "invalid modifier",
            Self::Interrupt => "invalid interrupt",
            Self::Checkvoice => "invalid checkvoice",
            Self::Conflict => "conflicting modifiers",
            Self::UnknownSpeaker => "unknown speaker",
        }
    }
}

impl fmt::Display for DiagnosticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every defect the validator can report.
///
/// Codes serialize in kebab-case (`jumpto-index-out-of-range`), which is also
/// how configuration files name them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DiagnosticCode {
    /// `pause` without a duration.
    PauseMissingArgument,
    /// `pause` with three or more arguments.
    PauseTooManyArguments,
    /// `pause` with a non-integer argument.
    PauseNotInteger,
    /// `pause` with a negative argument.
    PauseNegative,
    /// `pause a b` with `a > b`.
    PauseInvertedRange,
    /// `break` with an argument.
    BreakWithArgument,
    /// `break` with no flag gate on its line.
    BreakWithoutFlag,
    /// `jumpto` without a target.
    JumptoMissingTarget,
    /// `jumpto` with more than one target.
    JumptoTooManyArguments,
    /// `jumpto` to a line outside the script.
    JumptoIndexOutOfRange,
    /// `jumpto` to an undefined label.
    JumptoUnknownLabel,
    /// `firstswitch`/`moodswitch` target without the `seen_` prefix.
    AutoswitchMissingPrefix,
    /// `sourceswitch` base without the trailing `_`.
    AutoswitchMissingSuffix,
    /// Autoswitch with the wrong number of arguments.
    AutoswitchWrongArity,
    /// Autoswitch naming an undefined label.
    AutoswitchUnknownLabel,
    /// `sourceswitch` base that no label starts with.
    AutoswitchNoSuffixedLabel,
    /// Switchjump with no labels.
    SwitchjumpNoLabels,
    /// `stringswitchjump` with an odd number of arguments.
    SwitchjumpUnpairedArguments,
    /// Switchjump naming an undefined label.
    SwitchjumpUnknownLabel,
    /// `nowplaying` without a track.
    NowplayingMissingArgument,
    /// `label` without a name.
    LabelMissingName,
    /// `label` with more than one name.
    LabelTooManyArguments,
    /// A label defined twice.
    LabelDuplicate,
    /// A label nothing in the script jumps to.
    LabelUnreferenced,
    /// Two or more `///` dividers on one line.
    MultipleDividers,
    /// A `///` divider with nothing after it.
    EmptyModifierList,
    /// An unrecognized modifier name.
    UnknownModifier,
    /// A modifier entry whose argument list does not parse.
    MalformedArguments,
    /// A flag modifier given an argument.
    FlagWithArgument,
    /// A context check without exactly one argument.
    ContextArity,
    /// `ifnum`/`ifnumnot` with a non-integer argument.
    IfNumNotInteger,
    /// `checknovoice` without a persona.
    CheckNoVoiceMissingArgument,
    /// A persona argument outside the closed set.
    UnknownPersona,
    /// The same modifier twice on one line.
    RedundantModifier,
    /// Modifiers on a line that never evaluates them.
    ModifiersIgnored,
    /// `interrupt` on a line that is not dialogue.
    InterruptOnNonDialogue,
    /// `interrupt` with an argument.
    InterruptWithArgument,
    /// `checkvoice` with no argument where the speaker is not a persona.
    CheckVoiceWithoutPersona,
    /// A flag and its negation on one line.
    FlagAndNegation,
    /// A flag gate that repeats what the line's autoswitch already decides.
    FlagDuplicatesSwitch,
    /// A context or voice check that repeats what the line's switchjump decides.
    CheckDuplicatesSwitch,
    /// The same value both required and excluded by a context check.
    SameValueCheckedAndNegated,
    /// Two positive checks of one context requiring different values.
    AmbiguousContextChecks,
    /// A persona both required and excluded.
    VoiceRequiredAndExcluded,
    /// `checknovoice` excluding the line's own speaker.
    SpeakerExcluded,
    /// A `name:` prefix that is not a known speaker.
    UnknownSpeaker,
}

impl DiagnosticCode {
    /// The kebab-case name of this code.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The diagnostic type this code belongs to.
    pub fn kind(self) -> DiagnosticType {
        use DiagnosticCode::*;
        match self {
            PauseMissingArgument | PauseTooManyArguments | PauseNotInteger | PauseNegative
            | PauseInvertedRange => DiagnosticType::Pause,
            BreakWithArgument | BreakWithoutFlag => DiagnosticType::Break,
            JumptoMissingTarget | JumptoTooManyArguments | JumptoIndexOutOfRange
            | JumptoUnknownLabel => DiagnosticType::Jumpto,
            AutoswitchMissingPrefix | AutoswitchMissingSuffix | AutoswitchWrongArity
            | AutoswitchUnknownLabel | AutoswitchNoSuffixedLabel => DiagnosticType::Autoswitch,
            SwitchjumpNoLabels | SwitchjumpUnpairedArguments | SwitchjumpUnknownLabel => {
                DiagnosticType::Switchjump
            }
            NowplayingMissingArgument => DiagnosticType::Nowplaying,
            LabelMissingName | LabelTooManyArguments | LabelDuplicate | LabelUnreferenced => {
                DiagnosticType::Label
            }
            MultipleDividers | EmptyModifierList | UnknownModifier | MalformedArguments
            | FlagWithArgument | ContextArity | IfNumNotInteger | CheckNoVoiceMissingArgument
            | UnknownPersona | RedundantModifier | ModifiersIgnored => DiagnosticType::Modifier,
            InterruptOnNonDialogue | InterruptWithArgument => DiagnosticType::Interrupt,
            CheckVoiceWithoutPersona => DiagnosticType::Checkvoice,
            FlagAndNegation | FlagDuplicatesSwitch | CheckDuplicatesSwitch
            | SameValueCheckedAndNegated | AmbiguousContextChecks | VoiceRequiredAndExcluded
            | SpeakerExcluded => DiagnosticType::Conflict,
            UnknownSpeaker => DiagnosticType::UnknownSpeaker,
        }
    }

    /// The subtype, the second half of the `(type, subtype)` pair.
    pub fn subtype(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            PauseMissingArgument | NowplayingMissingArgument => "missing argument",
            PauseTooManyArguments | JumptoTooManyArguments | LabelTooManyArguments => {
                "too many arguments"
            }
            PauseNotInteger | IfNumNotInteger => "non-integer argument",
            PauseNegative => "negative argument",
            PauseInvertedRange => "inverted range",
            BreakWithArgument | FlagWithArgument | InterruptWithArgument => "unexpected argument",
            BreakWithoutFlag => "no flag condition",
            JumptoMissingTarget => "missing argument",
            JumptoIndexOutOfRange => "index out of range",
            JumptoUnknownLabel | AutoswitchUnknownLabel | SwitchjumpUnknownLabel => {
                "label not found"
            }
            AutoswitchMissingPrefix => "missing prefix",
            AutoswitchMissingSuffix => "missing suffix",
            AutoswitchWrongArity | ContextArity => "wrong argument count",
            AutoswitchNoSuffixedLabel => "no suffixed label",
            SwitchjumpNoLabels => "no labels",
            SwitchjumpUnpairedArguments => "unpaired arguments",
            LabelMissingName => "missing name",
            LabelDuplicate => "duplicate label",
            LabelUnreferenced => "unreferenced label",
            MultipleDividers => "multiple dividers",
            EmptyModifierList => "empty modifier list",
            UnknownModifier => "unknown modifier",
            MalformedArguments => "malformed arguments",
            CheckNoVoiceMissingArgument => "missing voice argument",
            UnknownPersona => "unknown persona",
            RedundantModifier => "redundant modifier",
            ModifiersIgnored => "modifiers ignored",
            InterruptOnNonDialogue => "non-dialogue line",
            CheckVoiceWithoutPersona => "speaker is not a persona",
            FlagAndNegation => "flag and negation",
            FlagDuplicatesSwitch => "flag duplicates switch",
            CheckDuplicatesSwitch => "check duplicates switch",
            SameValueCheckedAndNegated => "same value checked and negated",
            AmbiguousContextChecks => "ambiguous context checks",
            VoiceRequiredAndExcluded => "voice required and excluded",
            SpeakerExcluded => "speaker excluded",
            UnknownSpeaker => "unknown speaker",
        }
    }

    /// Severity used unless the validator configuration overrides it.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::LabelUnreferenced
            | Self::RedundantModifier
            | Self::ModifiersIgnored
            | Self::UnknownSpeaker => Severity::Note,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single validator finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 0-based index of the offending line.
    pub line: usize,
    /// Byte range within the document, for snippet rendering.
    pub span: Span,
    /// What was found.
    pub code: DiagnosticCode,
    /// Offending labels, values, or modifier names.
    pub details: Vec<String>,
    /// Error or note.
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity.
    pub fn new(line: usize, span: Span, code: DiagnosticCode) -> Self {
        Self {
            line,
            span,
            code,
            details: Vec::new(),
            severity: code.default_severity(),
        }
    }

    /// Attach detail strings.
    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }

    /// The `(type, subtype)` pair.
    pub fn kind(&self) -> (DiagnosticType, &'static str) {
        (self.code.kind(), self.code.subtype())
    }

    /// Whether this diagnostic has error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn message(&self) -> String {
        format!("{}: {}", self.code.kind(), self.code.subtype())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}: {}",
            self.line + 1,
            self.code.kind(),
            self.code.subtype()
        )?;
        if !self.details.is_empty() {
            write!(f, " [{}]", self.details.join(", "))?;
        }
        Ok(())
    }
}

/// Serialized form of one diagnostic.
#[derive(Debug, Serialize)]
struct DiagnosticRecord<'a> {
    line: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    subtype: &'static str,
    code: DiagnosticCode,
    details: &'a [String],
    severity: Severity,
}

/// Ordered diagnostics from one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Wrap diagnostics, ordering them by line. Order within a line is kept.
    pub fn new(mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by_key(|d| d.line);
        Self { diagnostics }
    }

    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Note-severity diagnostics.
    pub fn notes(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// All diagnostics in order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// One line per diagnostic: `error: line 3: invalid jumpto: ...`.
    pub fn render_text(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| format!("{}: {d}\n", d.severity))
            .collect()
    }

    /// A JSON array of diagnostic records with 1-based line numbers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let records: Vec<DiagnosticRecord<'_>> = self
            .diagnostics
            .iter()
            .map(|d| DiagnosticRecord {
                line: d.line + 1,
                kind: d.code.kind().name(),
                subtype: d.code.subtype(),
                code: d.code,
                details: &d.details,
                severity: d.severity,
            })
            .collect();
        serde_json::to_string_pretty(&records)
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// Render diagnostics as annotated source snippets using ariadne.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Note => (ReportKind::Advice, Color::Cyan),
        };

        let label_text = if diag.details.is_empty() {
            diag.code.subtype().to_string()
        } else {
            diag.details.join(", ")
        };

        AriadneReport::build(kind, (filename, diag.span.clone()))
            .with_code(diag.code.name())
            .with_message(diag.message())
            .with_label(
                Label::new((filename, diag.span.clone()))
                    .with_message(label_text)
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(2, 10..19, DiagnosticCode::JumptoIndexOutOfRange).with_details(["5"]);
        assert_eq!(d.to_string(), "line 3: invalid jumpto: index out of range [5]");
    }

    #[test]
    fn code_names_are_kebab_case() {
        assert_eq!(DiagnosticCode::LabelUnreferenced.name(), "label-unreferenced");
        assert_eq!(DiagnosticCode::IfNumNotInteger.name(), "if-num-not-integer");
    }

    #[test]
    fn type_subtype_pairs_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for code in DiagnosticCode::iter() {
            assert!(
                seen.insert((code.kind(), code.subtype())),
                "{code} shares its (type, subtype) pair"
            );
        }
    }

    #[test]
    fn default_severities() {
        assert_eq!(DiagnosticCode::LabelDuplicate.default_severity(), Severity::Error);
        assert_eq!(DiagnosticCode::LabelUnreferenced.default_severity(), Severity::Note);
    }

    #[test]
    fn report_orders_by_line_and_counts_errors() {
        let report = Report::new(vec![
            Diagnostic::new(4, 0..0, DiagnosticCode::UnknownSpeaker),
            Diagnostic::new(1, 0..0, DiagnosticCode::PauseNegative),
        ]);
        assert_eq!(report.diagnostics()[0].line, 1);
        assert!(report.has_errors());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.notes().count(), 1);
    }

    #[test]
    fn text_rendering() {
        let report = Report::new(vec![
            Diagnostic::new(0, 0..0, DiagnosticCode::PauseMissingArgument),
            Diagnostic::new(3, 0..0, DiagnosticCode::VoiceRequiredAndExcluded)
                .with_details(["cold"]),
        ]);
        insta::assert_snapshot!(report.render_text().trim_end(), @r"
        error: line 1: invalid pause: missing argument
        error: line 4: conflicting modifiers: voice required and excluded [cold]
        ");
    }

    #[test]
    fn json_records() {
        let report = Report::new(vec![
            Diagnostic::new(0, 0..5, DiagnosticCode::LabelUnreferenced).with_details(["intro"]),
        ]);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["line"], 1);
        assert_eq!(value[0]["type"], "invalid label");
        assert_eq!(value[0]["subtype"], "unreferenced label");
        assert_eq!(value[0]["code"], "label-unreferenced");
        assert_eq!(value[0]["details"][0], "intro");
        assert_eq!(value[0]["severity"], "note");
    }

    #[test]
    fn render_produces_output() {
        let source = "Hello.\njumpto nowhere\n";
        let diags = vec![
            Diagnostic::new(1, 7..21, DiagnosticCode::JumptoUnknownLabel).with_details(["nowhere"]),
        ];
        let output = render_diagnostics(source, "test.script", &diags);
        assert!(output.contains("invalid jumpto: label not found"));
        assert!(output.contains("nowhere"));
    }
}
