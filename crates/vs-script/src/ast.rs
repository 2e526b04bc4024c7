//! The script document model: lines, directives, and modifiers.

use std::fmt;

use vs_core::{Persona, Speaker, StoryFlag};

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// A recognized directive keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKeyword {
    /// `label`.
    Label,
    /// `jumpto`.
    Jumpto,
    /// `break`.
    Break,
    /// `pause`.
    Pause,
    /// `firstswitch`.
    FirstSwitch,
    /// `moodswitch`.
    MoodSwitch,
    /// `sourceswitch`.
    SourceSwitch,
    /// `bladeswitch`.
    BladeSwitch,
    /// `switchjump`.
    SwitchJump,
    /// `numswitchjump`.
    NumSwitchJump,
    /// `stringswitchjump`.
    StringSwitchJump,
    /// `nowplaying`.
    NowPlaying,
}

impl DirectiveKeyword {
    /// Every keyword, in documentation order.
    pub const ALL: [DirectiveKeyword; 12] = [
        Self::Label,
        Self::Jumpto,
        Self::Break,
        Self::Pause,
        Self::FirstSwitch,
        Self::MoodSwitch,
        Self::SourceSwitch,
        Self::BladeSwitch,
        Self::SwitchJump,
        Self::NumSwitchJump,
        Self::StringSwitchJump,
        Self::NowPlaying,
    ];

    /// Parse a keyword, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == lower)
    }

    /// The script spelling of this keyword.
    pub fn name(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Jumpto => "jumpto",
            Self::Break => "break",
            Self::Pause => "pause",
            Self::FirstSwitch => "firstswitch",
            Self::MoodSwitch => "moodswitch",
            Self::SourceSwitch => "sourceswitch",
            Self::BladeSwitch => "bladeswitch",
            Self::SwitchJump => "switchjump",
            Self::NumSwitchJump => "numswitchjump",
            Self::StringSwitchJump => "stringswitchjump",
            Self::NowPlaying => "nowplaying",
        }
    }

    /// Whether this is one of the autoswitch directives.
    pub fn is_autoswitch(self) -> bool {
        matches!(
            self,
            Self::FirstSwitch | Self::MoodSwitch | Self::SourceSwitch | Self::BladeSwitch
        )
    }

    /// Whether this is one of the switchjump directives.
    pub fn is_switchjump(self) -> bool {
        matches!(
            self,
            Self::SwitchJump | Self::NumSwitchJump | Self::StringSwitchJump
        )
    }
}

impl fmt::Display for DirectiveKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prefix every `firstswitch`/`moodswitch` target must carry.
pub const SEEN_PREFIX: &str = "seen_";

/// Suffix every `sourceswitch` base must end with.
pub const SOURCE_SEPARATOR: &str = "_";

/// Where a `jumpto` goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    /// A label in the same script.
    Label(String),
    /// A 1-based line number.
    Line(i64),
}

/// A parsed directive with well-formed arguments.
///
/// Label references are not resolved here; see the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A jump target marker.
    Label(String),
    /// Unconditional jump.
    Jumpto(JumpTarget),
    /// Halt and return control to the caller.
    Break,
    /// Delay in seconds, random within the inclusive range when `min != max`.
    Pause {
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },
    /// Jump to a `seen_` label on every arrival after the first.
    FirstSwitch(String),
    /// Like `FirstSwitch`, tracked separately per mood.
    MoodSwitch(String),
    /// Jump to `<base><source>`.
    SourceSwitch(String),
    /// Jump by blade possession.
    BladeSwitch {
        /// Target while the blade is held.
        held: String,
        /// Target once the blade was held but no longer is.
        former: String,
        /// Target if the blade was never held.
        never: String,
    },
    /// Jump to the first label whose persona is active.
    SwitchJump(Vec<String>),
    /// Jump to the label indexed by the numeric counter.
    NumSwitchJump(Vec<String>),
    /// Jump to the label paired with the current string context.
    StringSwitchJump(Vec<(String, String)>),
    /// Announce a music track.
    NowPlaying(String),
}

/// Why a directive's arguments could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveIssue {
    /// A required argument is absent.
    MissingArgument,
    /// More arguments than the directive accepts.
    TooManyArguments(usize),
    /// The directive takes no argument but got some.
    UnexpectedArgument(Vec<String>),
    /// A numeric argument did not parse.
    NotInteger(String),
    /// A numeric argument was below zero.
    Negative(String),
    /// `pause a b` with `a > b`.
    InvertedRange(u64, u64),
    /// A switch target lacks the required prefix.
    MissingPrefix(String),
    /// A `sourceswitch` base lacks the trailing separator.
    MissingSuffix(String),
    /// Wrong number of autoswitch arguments.
    WrongArity(usize),
    /// A switchjump with nothing to choose from.
    NoLabels,
    /// `stringswitchjump` with an odd number of arguments.
    UnpairedArguments(usize),
}

impl Directive {
    /// Parse a directive from its keyword and whitespace-split arguments.
    pub fn parse(keyword: DirectiveKeyword, args: &[String]) -> Result<Directive, DirectiveIssue> {
        match keyword {
            DirectiveKeyword::Label => single(args).map(Directive::Label),
            DirectiveKeyword::Jumpto => {
                let target = single(args)?;
                Ok(Directive::Jumpto(match target.parse::<i64>() {
                    Ok(n) => JumpTarget::Line(n),
                    Err(_) => JumpTarget::Label(target),
                }))
            }
            DirectiveKeyword::Break => {
                if args.is_empty() {
                    Ok(Directive::Break)
                } else {
                    Err(DirectiveIssue::UnexpectedArgument(args.to_vec()))
                }
            }
            DirectiveKeyword::Pause => parse_pause(args),
            DirectiveKeyword::FirstSwitch | DirectiveKeyword::MoodSwitch => {
                let [target] = args else {
                    return Err(DirectiveIssue::WrongArity(args.len()));
                };
                if !target.starts_with(SEEN_PREFIX) {
                    return Err(DirectiveIssue::MissingPrefix(target.clone()));
                }
                Ok(if keyword == DirectiveKeyword::FirstSwitch {
                    Directive::FirstSwitch(target.clone())
                } else {
                    Directive::MoodSwitch(target.clone())
                })
            }
            DirectiveKeyword::SourceSwitch => {
                let [base] = args else {
                    return Err(DirectiveIssue::WrongArity(args.len()));
                };
                if !base.ends_with(SOURCE_SEPARATOR) {
                    return Err(DirectiveIssue::MissingSuffix(base.clone()));
                }
                Ok(Directive::SourceSwitch(base.clone()))
            }
            DirectiveKeyword::BladeSwitch => {
                let [held, former, never] = args else {
                    return Err(DirectiveIssue::WrongArity(args.len()));
                };
                Ok(Directive::BladeSwitch {
                    held: held.clone(),
                    former: former.clone(),
                    never: never.clone(),
                })
            }
            DirectiveKeyword::SwitchJump | DirectiveKeyword::NumSwitchJump => {
                if args.is_empty() {
                    return Err(DirectiveIssue::NoLabels);
                }
                Ok(if keyword == DirectiveKeyword::SwitchJump {
                    Directive::SwitchJump(args.to_vec())
                } else {
                    Directive::NumSwitchJump(args.to_vec())
                })
            }
            DirectiveKeyword::StringSwitchJump => {
                if args.is_empty() {
                    return Err(DirectiveIssue::NoLabels);
                }
                if args.len() % 2 != 0 {
                    return Err(DirectiveIssue::UnpairedArguments(args.len()));
                }
                Ok(Directive::StringSwitchJump(
                    args.chunks(2)
                        .map(|pair| (pair[0].clone(), pair[1].clone()))
                        .collect(),
                ))
            }
            DirectiveKeyword::NowPlaying => {
                if args.is_empty() {
                    Err(DirectiveIssue::MissingArgument)
                } else {
                    Ok(Directive::NowPlaying(args.join(" ")))
                }
            }
        }
    }

    /// Labels this directive names explicitly.
    ///
    /// `sourceswitch` bases and numeric `jumpto` targets are not included.
    pub fn label_references(&self) -> Vec<&str> {
        match self {
            Directive::Jumpto(JumpTarget::Label(l))
            | Directive::FirstSwitch(l)
            | Directive::MoodSwitch(l) => vec![l.as_str()],
            Directive::BladeSwitch {
                held,
                former,
                never,
            } => vec![held.as_str(), former.as_str(), never.as_str()],
            Directive::SwitchJump(labels) | Directive::NumSwitchJump(labels) => {
                labels.iter().map(String::as_str).collect()
            }
            Directive::StringSwitchJump(pairs) => pairs.iter().map(|(_, l)| l.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn single(args: &[String]) -> Result<String, DirectiveIssue> {
    match args {
        [] => Err(DirectiveIssue::MissingArgument),
        [one] => Ok(one.clone()),
        more => Err(DirectiveIssue::TooManyArguments(more.len())),
    }
}

fn parse_pause(args: &[String]) -> Result<Directive, DirectiveIssue> {
    if args.is_empty() {
        return Err(DirectiveIssue::MissingArgument);
    }
    if args.len() > 2 {
        return Err(DirectiveIssue::TooManyArguments(args.len()));
    }

    let mut values = Vec::with_capacity(2);
    for arg in args {
        let n: i64 = arg
            .parse()
            .map_err(|_| DirectiveIssue::NotInteger(arg.clone()))?;
        let n = u64::try_from(n).map_err(|_| DirectiveIssue::Negative(arg.clone()))?;
        values.push(n);
    }

    let min = values[0];
    let max = values.get(1).copied().unwrap_or(min);
    if min > max {
        return Err(DirectiveIssue::InvertedRange(min, max));
    }
    Ok(Directive::Pause { min, max })
}

/// Arguments of a raw modifier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgs {
    /// No parenthesized list.
    None,
    /// A well-formed, possibly empty, argument list.
    List(Vec<String>),
    /// The entry's shape could not be parsed; holds its source text.
    Malformed(String),
}

impl RawArgs {
    /// The parsed arguments, empty for `None` and `Malformed`.
    pub fn values(&self) -> &[String] {
        match self {
            RawArgs::List(values) => values,
            _ => &[],
        }
    }
}

/// One entry of a modifier block, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModifier {
    /// The modifier name, lowercased.
    pub name: String,
    /// The argument list.
    pub args: RawArgs,
    /// Location of the entry in the document.
    pub span: Span,
}

/// The kind of external context a context gate compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// `ifsource` / `ifsourcenot`.
    Source,
    /// `ifstring` / `ifstringnot`.
    String,
    /// `ifnum` / `ifnumnot`.
    Number,
}

impl ContextKind {
    /// The positive modifier name.
    pub fn modifier_name(self) -> &'static str {
        match self {
            ContextKind::Source => "ifsource",
            ContextKind::String => "ifstring",
            ContextKind::Number => "ifnum",
        }
    }
}

/// The value a context gate compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextValue {
    /// A source or string value.
    Text(String),
    /// A numeric value.
    Number(i64),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(s) => write!(f, "{s}"),
            ContextValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A typed line modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Gate on a story flag, or its negation.
    Flag {
        /// The flag tested.
        flag: StoryFlag,
        /// Whether the line runs when the flag does *not* hold.
        negated: bool,
    },
    /// Require every listed persona; an empty list means the speaker's own.
    CheckVoice(Vec<Persona>),
    /// Require none of the listed personas.
    CheckNoVoice(Vec<Persona>),
    /// Gate on external source, string, or numeric context.
    Context {
        /// Which context value is compared.
        kind: ContextKind,
        /// The value compared against.
        value: ContextValue,
        /// Whether the line runs when the value differs.
        negated: bool,
    },
    /// Suppress the acknowledgement wait after the line.
    Interrupt,
}

/// Why a raw modifier entry could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierIssue {
    /// The name is not a known modifier.
    Unknown(String),
    /// The entry's shape is malformed.
    Malformed(String),
    /// A no-argument flag was given arguments.
    FlagArgument(String),
    /// `interrupt` was given arguments.
    InterruptArgument,
    /// A context gate needs exactly one argument.
    ContextArity {
        /// The modifier name.
        name: String,
        /// The number of arguments given.
        count: usize,
    },
    /// `ifnum`/`ifnumnot` argument is not an integer.
    NotInteger(String),
    /// `checknovoice` needs at least one persona.
    MissingVoiceArgument,
    /// Persona arguments not in the closed set.
    UnknownPersonas(Vec<String>),
}

impl Modifier {
    /// Interpret a raw modifier entry.
    pub fn from_raw(raw: &RawModifier) -> Result<Modifier, ModifierIssue> {
        let name = raw.name.as_str();
        let args = match &raw.args {
            RawArgs::Malformed(text) => return Err(ModifierIssue::Malformed(text.clone())),
            other => other.values(),
        };
        let kind =
            ModifierName::parse(name).ok_or_else(|| ModifierIssue::Unknown(name.to_string()))?;

        match kind {
            ModifierName::Flag { flag, negated } => {
                if args.is_empty() {
                    Ok(Modifier::Flag { flag, negated })
                } else {
                    Err(ModifierIssue::FlagArgument(name.to_string()))
                }
            }
            ModifierName::Interrupt => {
                if args.is_empty() {
                    Ok(Modifier::Interrupt)
                } else {
                    Err(ModifierIssue::InterruptArgument)
                }
            }
            ModifierName::CheckVoice => personas(args).map(Modifier::CheckVoice),
            ModifierName::CheckNoVoice => {
                if args.is_empty() {
                    return Err(ModifierIssue::MissingVoiceArgument);
                }
                personas(args).map(Modifier::CheckNoVoice)
            }
            ModifierName::Context { kind, negated } => {
                let [value] = args else {
                    return Err(ModifierIssue::ContextArity {
                        name: name.to_string(),
                        count: args.len(),
                    });
                };
                let value = match kind {
                    ContextKind::Number => ContextValue::Number(
                        value
                            .parse()
                            .map_err(|_| ModifierIssue::NotInteger(value.clone()))?,
                    ),
                    _ => ContextValue::Text(value.clone()),
                };
                Ok(Modifier::Context {
                    kind,
                    value,
                    negated,
                })
            }
        }
    }

    /// The script name of this modifier.
    pub fn name(&self) -> String {
        match self {
            Modifier::Flag { flag, negated } => {
                if *negated {
                    format!("not{}", flag.name())
                } else {
                    flag.name().to_string()
                }
            }
            Modifier::CheckVoice(_) => "checkvoice".to_string(),
            Modifier::CheckNoVoice(_) => "checknovoice".to_string(),
            Modifier::Context { kind, negated, .. } => {
                if *negated {
                    format!("{}not", kind.modifier_name())
                } else {
                    kind.modifier_name().to_string()
                }
            }
            Modifier::Interrupt => "interrupt".to_string(),
        }
    }

    /// Whether this modifier is a flag gate.
    pub fn is_flag(&self) -> bool {
        matches!(self, Modifier::Flag { .. })
    }
}

fn personas(args: &[String]) -> Result<Vec<Persona>, ModifierIssue> {
    let mut found = Vec::with_capacity(args.len());
    let mut unknown = Vec::new();
    for arg in args {
        match Persona::from_name(arg) {
            Some(p) => found.push(p),
            None => unknown.push(arg.clone()),
        }
    }
    if unknown.is_empty() {
        Ok(found)
    } else {
        Err(ModifierIssue::UnknownPersonas(unknown))
    }
}

/// A recognized modifier name, before argument checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierName {
    Flag { flag: StoryFlag, negated: bool },
    CheckVoice,
    CheckNoVoice,
    Context { kind: ContextKind, negated: bool },
    Interrupt,
}

impl ModifierName {
    fn parse(name: &str) -> Option<Self> {
        let context = |kind, negated| Some(ModifierName::Context { kind, negated });
        match name {
            "interrupt" => Some(ModifierName::Interrupt),
            "checkvoice" => Some(ModifierName::CheckVoice),
            "checknovoice" => Some(ModifierName::CheckNoVoice),
            "ifsource" => context(ContextKind::Source, false),
            "ifsourcenot" => context(ContextKind::Source, true),
            "ifstring" => context(ContextKind::String, false),
            "ifstringnot" => context(ContextKind::String, true),
            "ifnum" => context(ContextKind::Number, false),
            "ifnumnot" => context(ContextKind::Number, true),
            other => {
                let (flag_name, negated) = match other.strip_prefix("not") {
                    Some(rest) => (rest, true),
                    None => (other, false),
                };
                flag_name
                    .parse::<StoryFlag>()
                    .ok()
                    .map(|flag| ModifierName::Flag { flag, negated })
            }
        }
    }
}

/// What a line contains, ignoring its modifier block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineContent {
    /// A blank section divider.
    Blank,
    /// Spoken or narrated text.
    Dialogue {
        /// Who speaks the line.
        speaker: Speaker,
        /// The text, without speaker prefix.
        text: String,
        /// A `name:` prefix that did not match any speaker.
        unknown_speaker: Option<String>,
    },
    /// A directive line.
    Directive {
        /// The keyword.
        keyword: DirectiveKeyword,
        /// Whitespace-split arguments.
        args: Vec<String>,
        /// The parsed directive, or why it did not parse.
        parsed: Result<Directive, DirectiveIssue>,
    },
}

/// The trailing modifier block of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierBlock {
    /// No `///` on the line.
    Absent,
    /// One block with at least one entry.
    Entries(Vec<RawModifier>),
    /// A divider with nothing after it.
    Empty,
    /// More than one divider; holds the divider count.
    MultipleDividers(usize),
}

impl ModifierBlock {
    /// The raw entries, if the block parsed.
    pub fn entries(&self) -> &[RawModifier] {
        match self {
            ModifierBlock::Entries(entries) => entries,
            _ => &[],
        }
    }

    /// Whether the line had any divider.
    pub fn is_present(&self) -> bool {
        !matches!(self, ModifierBlock::Absent)
    }
}

/// One parsed line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 0-based position in the script.
    pub index: usize,
    /// Byte range of the line in the document.
    pub span: Span,
    /// The line as written.
    pub raw: String,
    /// The classified content.
    pub content: LineContent,
    /// The raw modifier block.
    pub block: ModifierBlock,
    /// Modifiers from the block that interpreted cleanly.
    pub modifiers: Vec<Modifier>,
}

impl ScriptLine {
    /// 1-based line number for display.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Whether this is a dialogue line.
    pub fn is_dialogue(&self) -> bool {
        matches!(self.content, LineContent::Dialogue { .. })
    }

    /// The speaker of a dialogue line.
    pub fn speaker(&self) -> Option<Speaker> {
        match &self.content {
            LineContent::Dialogue { speaker, .. } => Some(*speaker),
            _ => None,
        }
    }

    /// The directive keyword of a directive line.
    pub fn keyword(&self) -> Option<DirectiveKeyword> {
        match &self.content {
            LineContent::Directive { keyword, .. } => Some(*keyword),
            _ => None,
        }
    }

    /// The parsed directive of a well-formed directive line.
    pub fn directive(&self) -> Option<&Directive> {
        match &self.content {
            LineContent::Directive { parsed: Ok(d), .. } => Some(d),
            _ => None,
        }
    }

    /// Whether the line carries the `interrupt` modifier.
    pub fn has_interrupt(&self) -> bool {
        self.modifiers.contains(&Modifier::Interrupt)
    }
}
