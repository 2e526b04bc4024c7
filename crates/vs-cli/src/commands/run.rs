use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use miette::miette;
use tracing::info;
use vs_core::{BladeState, NarrativeContext, Persona, Speaker, StoryFlag};
use vs_fiction::io::display_name;
use vs_fiction::{Cursor, PresentedLine, Presenter, RunOutcome, Runtime, StartAt};

use crate::config::VesselConfig;

/// Narrative state supplied on the command line.
#[derive(Debug, Default)]
pub struct ContextArgs {
    pub voices: Vec<String>,
    pub source: Option<String>,
    pub string: Option<String>,
    pub number: i64,
    pub blade: String,
    pub flags: Vec<String>,
}

impl ContextArgs {
    fn build(&self) -> miette::Result<NarrativeContext> {
        let blade: BladeState = self.blade.parse().map_err(|err| miette!("{err}"))?;
        let mut ctx = NarrativeContext::new().with_blade(blade).with_number(self.number);

        for name in &self.voices {
            let persona = Persona::from_name(name).ok_or_else(|| miette!("unknown voice '{name}'"))?;
            ctx = ctx.with_voice(persona);
        }
        for name in &self.flags {
            let flag: StoryFlag = name.parse().map_err(|_| miette!("unknown flag '{name}'"))?;
            ctx = ctx.with_flag(flag);
        }
        if let Some(source) = &self.source {
            ctx = ctx.with_source(source);
        }
        if let Some(string) = &self.string {
            ctx = ctx.with_string(string);
        }
        Ok(ctx)
    }
}

/// Colored terminal presentation of script lines.
struct Terminal;

impl Presenter for Terminal {
    fn present(&mut self, line: &PresentedLine<'_>) -> io::Result<()> {
        let name = format!("{}:", display_name(line.speaker));
        let name = match line.speaker {
            Speaker::Narrator(_) => return writeln!(io::stdout().lock(), "{}", line.text),
            Speaker::Princess => name.magenta(),
            Speaker::Player => name.green(),
            Speaker::Voice(_) => name.yellow(),
        };
        writeln!(io::stdout().lock(), "{} {}", name.bold(), line.text)
    }

    fn acknowledge(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().lock().read_line(&mut buf)?;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> io::Result<()> {
        std::thread::sleep(duration);
        Ok(())
    }

    fn now_playing(&mut self, track: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", format!("~ Now playing: {track} ~").dimmed())
    }
}

pub fn run(
    file: &Path,
    label: Option<&str>,
    context: &ContextArgs,
    no_wait: bool,
    config: &VesselConfig,
) -> miette::Result<()> {
    let ctx = context.build()?;
    let script = super::load_script(file, &config.validator)?;

    let mut runtime_config = config.runtime.clone();
    if no_wait {
        runtime_config = runtime_config.with_wait(false).with_pause_scale(0.0);
    }
    let mut runtime = Runtime::new(runtime_config);
    let mut cursor = Cursor::new(&script);
    let mut presenter = Terminal;

    let mut start = match label {
        Some(label) => StartAt::Label(label),
        None => StartAt::Beginning,
    };

    // With no chapter logic to hand control to, a break just continues.
    loop {
        match runtime.run(&mut cursor, start, &ctx, &mut presenter).map_err(|err| miette!("{err}"))? {
            RunOutcome::Finished => break,
            RunOutcome::Broke => {
                info!(position = cursor.position() + 1, "break");
                println!("{}", format!("-- break before line {} --", cursor.position() + 1).dimmed());
                start = StartAt::Resume;
            }
        }
    }

    println!("{}", "-- end of script --".dimmed());
    Ok(())
}
