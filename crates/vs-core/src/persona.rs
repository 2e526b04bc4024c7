//! Personas, persona sets, narrators, and speakers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{CoreError, CoreResult};

/// One of the closed set of protagonist facets ("voices").
///
/// Declaration order is the canonical iteration order of a [`PersonaSet`].
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
pub enum Persona {
    /// The Voice of the Hero.
    Hero,
    /// The Voice of the Broken.
    Broken,
    /// The Voice of the Cheated.
    Cheated,
    /// The Voice of the Cold.
    Cold,
    /// The Voice of the Contrarian.
    Contrarian,
    /// The Voice of the Hunted.
    Hunted,
    /// The Voice of the Opportunist.
    Opportunist,
    /// The Voice of the Paranoid.
    Paranoid,
    /// The Voice of the Skeptic.
    Skeptic,
    /// The Voice of the Smitten.
    Smitten,
    /// The Voice of the Stubborn.
    Stubborn,
}

impl Persona {
    /// Look up a persona by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name.trim()).ok()
    }

    /// The lowercase script name of this persona.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// An explicit set of active personas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaSet {
    members: BTreeSet<Persona>,
}

impl PersonaSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set containing every persona.
    pub fn all() -> Self {
        Persona::iter().collect()
    }

    /// Add a persona. Returns `true` if it was not already present.
    pub fn insert(&mut self, persona: Persona) -> bool {
        self.members.insert(persona)
    }

    /// Remove a persona. Returns `true` if it was present.
    pub fn remove(&mut self, persona: Persona) -> bool {
        self.members.remove(&persona)
    }

    /// Check membership.
    pub fn contains(&self, persona: Persona) -> bool {
        self.members.contains(&persona)
    }

    /// Check that every listed persona is a member.
    pub fn contains_all(&self, personas: &[Persona]) -> bool {
        personas.iter().all(|p| self.contains(*p))
    }

    /// Check that at least one listed persona is a member.
    pub fn contains_any(&self, personas: &[Persona]) -> bool {
        personas.iter().any(|p| self.contains(*p))
    }

    /// Personas in either set.
    pub fn union(&self, other: &PersonaSet) -> PersonaSet {
        self.members.union(&other.members).copied().collect()
    }

    /// Personas in both sets.
    pub fn intersection(&self, other: &PersonaSet) -> PersonaSet {
        self.members.intersection(&other.members).copied().collect()
    }

    /// Personas in this set but not the other.
    pub fn difference(&self, other: &PersonaSet) -> PersonaSet {
        self.members.difference(&other.members).copied().collect()
    }

    /// Whether every member of this set is also in `other`.
    pub fn is_subset(&self, other: &PersonaSet) -> bool {
        self.members.is_subset(&other.members)
    }

    /// Number of active personas.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no persona is active.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Persona> + '_ {
        self.members.iter().copied()
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl FromIterator<Persona> for PersonaSet {
    fn from_iter<I: IntoIterator<Item = Persona>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl Extend<Persona> for PersonaSet {
    fn extend<I: IntoIterator<Item = Persona>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl fmt::Display for PersonaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Persona::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// A narrator-type speaker that may be present in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Narrator {
    /// The Narrator.
    Standard,
    /// The Princess acting as narrator.
    Princess,
}

/// Whoever speaks a dialogue line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// A narrator-type speaker.
    Narrator(Narrator),
    /// The Princess.
    Princess,
    /// The player character ("you").
    Player,
    /// One of the protagonist's voices.
    Voice(Persona),
}

impl Speaker {
    /// The persona behind this speaker, if it is a voice.
    pub fn persona(self) -> Option<Persona> {
        match self {
            Speaker::Voice(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this speaker is narrator-type.
    pub fn is_narrator(self) -> bool {
        matches!(self, Speaker::Narrator(_))
    }

    /// The script name of this speaker.
    pub fn name(self) -> &'static str {
        match self {
            Speaker::Narrator(Narrator::Standard) => "narrator",
            Speaker::Narrator(Narrator::Princess) => "princessnarrator",
            Speaker::Princess => "princess",
            Speaker::Player => "you",
            Speaker::Voice(p) => p.name(),
        }
    }
}

impl Default for Speaker {
    fn default() -> Self {
        Speaker::Narrator(Narrator::Standard)
    }
}

impl FromStr for Speaker {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "narrator" => Ok(Speaker::Narrator(Narrator::Standard)),
            "princessnarrator" => Ok(Speaker::Narrator(Narrator::Princess)),
            "princess" => Ok(Speaker::Princess),
            "you" => Ok(Speaker::Player),
            other => Persona::from_name(other)
                .map(Speaker::Voice)
                .ok_or_else(|| CoreError::UnknownSpeaker(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
