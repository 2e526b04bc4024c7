//! The narrative context: every piece of mutable story state the runtime and
//! menus read, bundled in one value and passed by reference.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{CoreError, CoreResult};
use crate::persona::{Narrator, Persona, PersonaSet};

/// A boolean story fact that scripts can gate lines on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoryFlag {
    /// This is the first vessel (first loop).
    FirstVessel,
    /// The blade is currently held. Derived from [`BladeState::Held`].
    HasBlade,
    /// The blade was thrown away.
    ThrewBlade,
    /// The player shared that they are in a loop.
    SharedLoop,
    /// The player insisted on sharing.
    SharedInsist,
    /// The player asked about the mirror.
    MirrorAsked,
    /// The player touched the mirror.
    MirrorTouched,
    /// This is the second visit to the mirror.
    #[strum(serialize = "mirror2")]
    MirrorSecondVisit,
    /// The scene is in its harsh mood.
    Harsh,
    /// The player knows their destiny.
    KnowsDestiny,
    /// A generic, scene-defined check.
    #[strum(serialize = "check")]
    GenericCheck,
}

impl StoryFlag {
    /// The lowercase script name of this flag.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Blade possession, as three exclusive states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BladeState {
    /// The blade has never been held.
    #[default]
    Never,
    /// The blade is held right now.
    Held,
    /// The blade was held before but is not now.
    Former,
}

impl FromStr for BladeState {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "never" => Ok(BladeState::Never),
            "held" => Ok(BladeState::Held),
            "former" => Ok(BladeState::Former),
            _ => Err(CoreError::UnknownBladeState(s.to_string())),
        }
    }
}

impl fmt::Display for BladeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BladeState::Never => "never",
            BladeState::Held => "held",
            BladeState::Former => "former",
        })
    }
}

/// Story state owned by chapter logic and read by the runtime and menus.
#[derive(Debug, Clone, Default)]
pub struct NarrativeContext {
    /// Personas currently present.
    pub voices: PersonaSet,
    /// The narrator-type speaker present in the scene, if any.
    pub narrator: Option<Narrator>,
    /// Blade possession.
    pub blade: BladeState,
    /// Which route or chapter the scene was entered from.
    pub source: Option<String>,
    /// Free-form string context compared by `ifstring` and `stringswitchjump`.
    pub string: Option<String>,
    /// Numeric counter compared by `ifnum` and `numswitchjump`.
    pub number: i64,
    /// Chapters the player has already visited.
    pub visited_chapters: BTreeSet<String>,
    flags: BTreeSet<StoryFlag>,
}

impl NarrativeContext {
    /// Create an empty context with the standard narrator present.
    pub fn new() -> Self {
        Self {
            narrator: Some(Narrator::Standard),
            ..Self::default()
        }
    }

    /// Add an active persona.
    pub fn with_voice(mut self, persona: Persona) -> Self {
        self.voices.insert(persona);
        self
    }

    /// Set a story flag.
    pub fn with_flag(mut self, flag: StoryFlag) -> Self {
        self.set_flag(flag, true);
        self
    }

    /// Set blade possession.
    pub fn with_blade(mut self, blade: BladeState) -> Self {
        self.blade = blade;
        self
    }

    /// Set the source context.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the string context.
    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.string = Some(value.into());
        self
    }

    /// Set the numeric counter.
    pub fn with_number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }

    /// Set or clear the narrator.
    pub fn with_narrator(mut self, narrator: Option<Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    /// Whether a story flag currently holds.
    pub fn has_flag(&self, flag: StoryFlag) -> bool {
        match flag {
            StoryFlag::HasBlade => self.blade == BladeState::Held,
            other => self.flags.contains(&other),
        }
    }

    /// Set or clear a story flag.
    ///
    /// `HasBlade` is routed through [`BladeState`]: clearing it while held
    /// leaves the blade in the `Former` state.
    pub fn set_flag(&mut self, flag: StoryFlag, value: bool) {
        match (flag, value) {
            (StoryFlag::HasBlade, true) => self.blade = BladeState::Held,
            (StoryFlag::HasBlade, false) => {
                if self.blade == BladeState::Held {
                    self.blade = BladeState::Former;
                }
            }
            (other, true) => {
                self.flags.insert(other);
            }
            (other, false) => {
                self.flags.remove(&other);
            }
        }
    }

    /// Record a chapter as visited.
    pub fn visit_chapter(&mut self, chapter: impl Into<String>) {
        self.visited_chapters.insert(chapter.into());
    }

    /// Whether the chapter has been visited.
    pub fn has_visited(&self, chapter: &str) -> bool {
        self.visited_chapters.contains(chapter)
    }

    /// Whether a narrator-type speaker is present.
    pub fn has_narrator(&self) -> bool {
        self.narrator.is_some()
    }
}
