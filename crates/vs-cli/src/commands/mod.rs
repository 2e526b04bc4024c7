pub mod check;
pub mod labels;
pub mod run;
pub mod table;

use std::path::Path;

use miette::miette;
use vs_script::diagnostics::render_diagnostics;
use vs_script::{Script, ScriptError, ValidatorConfig};

/// Read a script file as text for diagnostic rendering.
pub(crate) fn read_source(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

pub(crate) fn load_error(err: ScriptError) -> miette::Report {
    miette!("{err}")
}

/// Check a script file and turn it into a runnable script.
///
/// A rejected script has its errors printed to stderr.
pub(crate) fn load_script(path: &Path, config: &ValidatorConfig) -> miette::Result<Script> {
    let result = vs_script::library::check_path(path, config).map_err(load_error)?;
    let name = path.display().to_string();

    result.into_script().map_err(|report| {
        let errors: Vec<_> = report.errors().cloned().collect();
        eprint!("{}", render_diagnostics(&read_source(path), &name, &errors));
        miette!("{name} has {} error(s)", errors.len())
    })
}
