use comfy_table::{ContentArrangement, Table};
use vs_fiction::parser::{Arguments, BLANK, COMMANDS};

fn describe_arguments(arguments: &Arguments) -> String {
    match arguments {
        Arguments::CommandName => "[command]".to_string(),
        Arguments::Fixed(groups) => groups
            .iter()
            .map(|group| match group[0] {
                BLANK => "(none)".to_string(),
                canonical if group.len() > 1 => format!("{canonical} ({})", group[1..].join(", ")),
                canonical => canonical.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
    }
}

pub fn run() -> miette::Result<()> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Command", "Aliases", "Arguments", "Kind", "Description"]);

    for spec in COMMANDS {
        let name = spec
            .prefixes
            .first()
            .map(|p| p.to_string())
            .unwrap_or_else(|| format!("({})", spec.command.name()));
        let aliases = spec.prefixes.get(1..).unwrap_or_default().join(", ");
        let kind = if spec.meta { "meta" } else { "gameplay" };

        table.add_row(vec![
            name,
            aliases,
            describe_arguments(&spec.arguments),
            kind.to_string(),
            spec.description.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} commands", COMMANDS.len());

    Ok(())
}
