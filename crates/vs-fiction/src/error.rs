//! Error types for the fiction engine.
//!
//! Player input never produces an error; unrecognized commands and bad
//! choices are rebuffed in place. Errors here mean the enclosing narrative
//! cycle cannot continue.

use thiserror::Error;
use vs_script::ScriptError;

/// Result type for fiction operations.
pub type FictionResult<T> = Result<T, FictionError>;

/// Errors that abort a runtime or menu call.
#[derive(Debug, Error)]
pub enum FictionError {
    /// The script reached a state only an authoring bug can produce.
    #[error(transparent)]
    Defect(#[from] RuntimeDefect),

    /// The menu could not resolve an outcome.
    #[error(transparent)]
    Menu(#[from] MenuError),

    /// Reading input or writing output failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A script could not be loaded.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Fatal authoring defects detected while running a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeDefect {
    /// A jump or start position names a label the script does not define.
    #[error("{script}: label not found: {label}")]
    UnknownLabel {
        /// Script name.
        script: String,
        /// The missing label.
        label: String,
    },

    /// A switch directive had no branch for the current state.
    #[error("{script} line {line}: {directive} has no branch for {state}")]
    NoSwitchBranch {
        /// Script name.
        script: String,
        /// 1-based line number.
        line: usize,
        /// The directive keyword.
        directive: &'static str,
        /// The state that matched nothing.
        state: String,
    },

    /// A `jumpto` line number points outside the script.
    #[error("{script} line {line}: jump to line {target} is out of range")]
    LineOutOfRange {
        /// Script name.
        script: String,
        /// 1-based line number of the jump.
        line: usize,
        /// The requested 1-based target.
        target: i64,
    },

    /// A directive with unparseable arguments reached the runtime.
    #[error("{script} line {line}: malformed {directive} directive")]
    MalformedDirective {
        /// Script name.
        script: String,
        /// 1-based line number.
        line: usize,
        /// The directive keyword.
        directive: &'static str,
    },

    /// The run executed more lines than the configured limit.
    #[error("{script}: exceeded {limit} steps; the script probably loops")]
    StepLimit {
        /// Script name.
        script: String,
        /// The configured limit.
        limit: usize,
    },
}

/// Fatal conditions in the options menu engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// Every option is hidden or greyed.
    #[error("menu has no available options ({shown} shown, {total} total)")]
    NoAvailableOptions {
        /// Options still shown (greyed).
        shown: usize,
        /// Options in the menu.
        total: usize,
    },

    /// The input stream ended before an outcome was resolved.
    #[error("input closed before a choice was made")]
    InputClosed,
}
