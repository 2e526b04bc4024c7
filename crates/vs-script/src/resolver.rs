//! Label resolution.

use std::collections::HashMap;

use vs_core::Persona;

use crate::ast::{Directive, ScriptLine};

/// Fallback suffix tried when no label matches the current source.
pub const DEFAULT_SUFFIX: &str = "default";

/// A label bound to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    /// The label name.
    pub name: String,
    /// 0-based index of the `label` line.
    pub line: usize,
}

/// Maps label names to line indices for one script.
///
/// The first definition of a name wins; later ones are kept as duplicates
/// so the validator can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    entries: Vec<LabelEntry>,
    index: HashMap<String, usize>,
    duplicates: Vec<LabelEntry>,
}

impl LabelTable {
    /// Collect every well-formed `label` directive from parsed lines.
    pub fn from_lines(lines: &[ScriptLine]) -> Self {
        let mut table = Self::default();
        for line in lines {
            if let Some(Directive::Label(name)) = line.directive() {
                table.insert(name.clone(), line.index);
            }
        }
        table
    }

    fn insert(&mut self, name: String, line: usize) {
        if self.index.contains_key(&name) {
            self.duplicates.push(LabelEntry { name, line });
            return;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(LabelEntry { name, line });
    }

    /// Line index of a label.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&i| self.entries[i].line)
    }

    /// Whether a label is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Labels starting with `prefix`, in line order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a LabelEntry> + 'a {
        self.entries.iter().filter(move |e| e.name.starts_with(prefix))
    }

    /// Resolve `<base><source>`, falling back to `<base>default`.
    ///
    /// Returns the matched label name and its line.
    pub fn resolve_suffixed(&self, base: &str, source: Option<&str>) -> Option<(String, usize)> {
        let candidates = source
            .map(|s| format!("{base}{s}"))
            .into_iter()
            .chain(std::iter::once(format!("{base}{DEFAULT_SUFFIX}")));

        for candidate in candidates {
            if let Some(line) = self.get(&candidate) {
                return Some((candidate, line));
            }
        }
        None
    }

    /// Labels redefined after their first definition.
    pub fn duplicates(&self) -> &[LabelEntry] {
        &self.duplicates
    }

    /// All labels in line order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
        self.entries.iter()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the script defines no labels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The persona a `switchjump` label is keyed on: its leading `_`-segment.
pub fn label_persona(label: &str) -> Option<Persona> {
    label.split('_').next().and_then(Persona::from_name)
}
