//! Execution position within one script.

use std::collections::HashSet;

use vs_script::Script;

/// Where a run begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAt<'a> {
    /// The first line.
    Beginning,
    /// A named label.
    Label(&'a str),
    /// `base` followed by the context source, falling back to `base` + `default`.
    SourceSuffixed(&'a str),
    /// Wherever the cursor stopped, e.g. after a `break`.
    Resume,
}

/// A switch line that has been passed before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Seen {
    /// A `firstswitch` line.
    First(usize),
    /// A `moodswitch` line, per mood.
    Mood { line: usize, harsh: bool },
}

/// A position in a script plus the switches it has already passed.
///
/// Each cursor is independent; a scene may keep a main and a secondary
/// cursor over different scripts and run either.
#[derive(Debug, Clone)]
pub struct Cursor<'s> {
    script: &'s Script,
    position: usize,
    seen: HashSet<Seen>,
}

impl<'s> Cursor<'s> {
    /// A cursor at the start of a script.
    pub fn new(script: &'s Script) -> Self {
        Self {
            script,
            position: 0,
            seen: HashSet::new(),
        }
    }

    /// The script this cursor walks.
    pub fn script(&self) -> &'s Script {
        self.script
    }

    /// The 0-based index of the next line to run.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the cursor has run off the end.
    pub fn is_finished(&self) -> bool {
        self.position >= self.script.len()
    }

    /// Forget every switch passed so far.
    pub fn forget_seen(&mut self) {
        self.seen.clear();
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Record an arrival; returns whether this switch was passed before.
    pub(crate) fn arrive(&mut self, seen: Seen) -> bool {
        !self.seen.insert(seen)
    }
}
