//! CLI frontend for the Vessel narrative script engine.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "vessel",
    about = "Vessel: check and play branching narrative scripts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: vessel.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per diagnostic.
    Text,
    /// A JSON array of files and their diagnostics.
    Json,
    /// Annotated source snippets.
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate script files or directories of .script files
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Run a script against a narrative context built from flags
    Run {
        /// Script file
        file: PathBuf,

        /// Start at this label instead of the beginning
        #[arg(short, long)]
        label: Option<String>,

        /// Active persona (repeatable)
        #[arg(long = "voice")]
        voices: Vec<String>,

        /// Source context
        #[arg(long)]
        source: Option<String>,

        /// String context
        #[arg(long)]
        string: Option<String>,

        /// Numeric context
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        number: i64,

        /// Blade possession: held, former, or never
        #[arg(long, default_value = "never")]
        blade: String,

        /// Story flag to set (repeatable)
        #[arg(long = "flag")]
        flags: Vec<String>,

        /// Do not wait for Enter after each line, and skip pauses
        #[arg(long)]
        no_wait: bool,
    },

    /// Print the player command table
    Commands,

    /// List the labels of a script
    Labels {
        /// Script file
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = config::VesselConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { paths, format } => commands::check::run(&paths, format, &config),
        Commands::Run {
            file,
            label,
            voices,
            source,
            string,
            number,
            blade,
            flags,
            no_wait,
        } => {
            let context = commands::run::ContextArgs {
                voices,
                source,
                string,
                number,
                blade,
                flags,
            };
            commands::run::run(&file, label.as_deref(), &context, no_wait, &config)
        }
        Commands::Commands => commands::table::run(),
        Commands::Labels { file } => commands::labels::run(&file, &config),
    }
}
