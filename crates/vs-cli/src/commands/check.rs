use std::path::{Path, PathBuf};

use colored::Colorize;
use miette::{IntoDiagnostic, miette};
use serde_json::{Value, json};
use tracing::debug;
use vs_script::diagnostics::render_diagnostics;
use vs_script::library::{check_path, collect_scripts};

use crate::Format;
use crate::config::VesselConfig;

/// Expand directories into the `.script` files beneath them.
fn expand(paths: &[PathBuf]) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(collect_scripts(path).map_err(super::load_error)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

#[derive(Default)]
struct Totals {
    files: usize,
    errors: usize,
    notes: usize,
    unreadable: usize,
}

pub fn run(paths: &[PathBuf], format: Format, config: &VesselConfig) -> miette::Result<()> {
    let files = expand(paths)?;
    debug!(count = files.len(), "checking scripts");

    let mut totals = Totals::default();
    let mut json_files = Vec::new();

    for file in &files {
        totals.files += 1;
        let name = file.display().to_string();
        let result = match check_path(file, &config.validator) {
            Ok(result) => result,
            Err(err) => {
                totals.unreadable += 1;
                eprintln!("{} {err}", "error:".red().bold());
                continue;
            }
        };

        let report = &result.report;
        totals.errors += report.errors().count();
        totals.notes += report.notes().count();

        match format {
            Format::Text => {
                for line in report.render_text().lines() {
                    println!("{name}: {line}");
                }
            }
            Format::Json => {
                let records = report.to_json().into_diagnostic()?;
                let diagnostics: Value = serde_json::from_str(&records).into_diagnostic()?;
                json_files.push(json!({ "file": name, "diagnostics": diagnostics }));
            }
            Format::Pretty => print_pretty(file, &name, report),
        }
    }

    if format == Format::Json {
        let out = serde_json::to_string_pretty(&Value::Array(json_files)).into_diagnostic()?;
        println!("{out}");
    } else {
        print_summary(&totals);
    }

    if totals.errors > 0 || totals.unreadable > 0 {
        Err(miette!("{} error(s) in {} file(s)", totals.errors + totals.unreadable, totals.files))
    } else {
        Ok(())
    }
}

fn print_pretty(file: &Path, name: &str, report: &vs_script::Report) {
    if report.is_empty() {
        return;
    }
    let source = super::read_source(file);
    eprint!("{}", render_diagnostics(&source, name, report.diagnostics()));
}

fn print_summary(totals: &Totals) {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let files = format!("{} file{}", totals.files, plural(totals.files));

    if totals.errors == 0 && totals.unreadable == 0 {
        println!(
            "  {} {files} checked, {} note{}",
            "ok:".green().bold(),
            totals.notes,
            plural(totals.notes)
        );
    } else {
        println!(
            "  {} {files} checked, {} error{}, {} note{}",
            "failed:".red().bold(),
            totals.errors + totals.unreadable,
            plural(totals.errors + totals.unreadable),
            totals.notes,
            plural(totals.notes)
        );
    }
}
