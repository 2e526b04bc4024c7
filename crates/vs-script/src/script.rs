//! Checked script representation.

use crate::ast::ScriptLine;
use crate::diagnostics::Report;
use crate::parser::ScriptDocument;
use crate::resolver::LabelTable;

/// A script that passed validation and may be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    document: ScriptDocument,
}

impl Script {
    /// Path-like script name.
    pub fn name(&self) -> &str {
        &self.document.name
    }

    /// Lines in source order.
    pub fn lines(&self) -> &[ScriptLine] {
        &self.document.lines
    }

    /// The line at a 0-based index.
    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.document.line(index)
    }

    /// The label table.
    pub fn labels(&self) -> &LabelTable {
        &self.document.labels
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether the script has no lines.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// The underlying document.
    pub fn document(&self) -> &ScriptDocument {
        &self.document
    }
}

/// Result of parsing and validating one script.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// The parsed document, whether or not it validated.
    pub document: ScriptDocument,
    /// Everything the validator found.
    pub report: Report,
}

impl CheckResult {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }

    /// Accept the script for execution, or hand back the report.
    ///
    /// Notes alone do not reject a script.
    pub fn into_script(self) -> Result<Script, Report> {
        if self.report.has_errors() {
            Err(self.report)
        } else {
            Ok(Script {
                document: self.document,
            })
        }
    }
}
