//! The Vessel script language: a line-oriented dialogue DSL with trailing
//! `///` modifier blocks, its parser, and its static validator.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod library;
pub mod parser;
pub mod resolver;
pub mod script;
pub mod validator;

pub use ast::{Directive, DirectiveKeyword, LineContent, Modifier, ScriptLine};
pub use config::ValidatorConfig;
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticType, Report, Severity};
pub use error::{ScriptError, ScriptResult};
pub use library::ScriptLibrary;
pub use parser::ScriptDocument;
pub use resolver::LabelTable;
pub use script::{CheckResult, Script};

/// Parse a script without validating it.
pub fn parse_source(name: &str, source: &str) -> ScriptDocument {
    parser::parse(name, source)
}

/// Parse and validate a script.
pub fn check_source(name: &str, source: &str, config: &ValidatorConfig) -> CheckResult {
    let document = parser::parse(name, source);
    let report = validator::validate(&document, config);
    CheckResult { document, report }
}

/// Parse and validate raw bytes.
///
/// Bytes that are not UTF-8 are the only input that cannot be checked.
pub fn check_bytes(name: &str, bytes: &[u8], config: &ValidatorConfig) -> ScriptResult<CheckResult> {
    let source = std::str::from_utf8(bytes).map_err(|source| ScriptError::Encoding {
        name: name.to_string(),
        source,
    })?;
    Ok(check_source(name, source, config))
}
