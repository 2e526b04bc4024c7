use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use crate::config::VesselConfig;

pub fn run(file: &Path, config: &VesselConfig) -> miette::Result<()> {
    let script = super::load_script(file, &config.validator)?;

    if script.labels().is_empty() {
        println!("  No labels in {}.", script.name());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Label", "Line"]);

    for entry in script.labels().iter() {
        table.add_row(vec![entry.name.clone(), (entry.line + 1).to_string()]);
    }

    println!("{table}");
    println!();
    println!("  {} labels", script.labels().len());

    Ok(())
}
